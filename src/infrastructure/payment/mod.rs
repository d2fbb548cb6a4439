pub mod gateway;
pub mod http_gateway;

pub use gateway::{PaymentGateway, PaymentGatewayError};
pub use http_gateway::HttpPaymentGateway;
