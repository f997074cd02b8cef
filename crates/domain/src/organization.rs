//! Seller organizations and the payment methods they accept.

use serde::{Deserialize, Serialize};

/// Payment method families a seller can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethodType {
    Account,
    Mocoin,
}

/// One accepted-payment configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAccepted {
    pub payment_method_type: PaymentMethodType,
    pub account_type: String,
    pub account_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub payment_accepted: Vec<PaymentAccepted>,
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            payment_accepted: Vec::new(),
        }
    }

    pub fn accepting(
        mut self,
        payment_method_type: PaymentMethodType,
        account_type: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        self.payment_accepted.push(PaymentAccepted {
            payment_method_type,
            account_type: account_type.into(),
            account_number: account_number.into(),
        });
        self
    }

    /// Finds the accepted-payment entry for a method, optionally narrowed by account type.
    pub fn find_payment_accepted(
        &self,
        payment_method_type: PaymentMethodType,
        account_type: Option<&str>,
    ) -> Option<&PaymentAccepted> {
        self.payment_accepted.iter().find(|p| {
            p.payment_method_type == payment_method_type
                && account_type.is_none_or(|t| p.account_type == t)
        })
    }
}
