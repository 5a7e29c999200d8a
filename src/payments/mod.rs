pub mod payhere;

pub use payhere::{CheckoutFields, PayHereGateway, PaymentNotification};
