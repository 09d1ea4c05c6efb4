//! Payment collaborator contract
//!
//! The engine hands the final order total to an external payment gateway and
//! verifies the result through this seam; it performs no signature checks of
//! its own.

use rusty_money::{Money, iso::Currency};

/// A payment intent created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Gateway-assigned intent id.
    pub intent_id: String,

    /// Amount the gateway will charge, in minor units.
    pub amount_minor: i64,
}

/// Result of verifying a completed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentVerification {
    /// Whether the gateway confirmed the payment.
    pub verified: bool,
}

/// The two calls the checkout flow makes against the payment gateway.
pub trait PaymentGateway {
    /// Gateway failure type.
    type Error;

    /// Create an intent to charge an amount against a receipt reference.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error when the intent cannot be created.
    fn create_payment_intent(
        &self,
        amount: Money<'_, Currency>,
        receipt: &str,
    ) -> Result<PaymentIntent, Self::Error>;

    /// Verify a completed payment against its gateway signature.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error when verification cannot be performed.
    fn verify_payment(
        &self,
        intent_id: &str,
        payment_ref: &str,
        signature: &str,
    ) -> Result<PaymentVerification, Self::Error>;
}
