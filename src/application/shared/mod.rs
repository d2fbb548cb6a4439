pub mod api_key_helpers;
