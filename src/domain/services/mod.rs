pub mod work_request_lifecycle;
