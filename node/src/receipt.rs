//! Results of mined transactions.

use edao_types::{BlockHeight, ErrorCode};
use serde::Serialize;

use crate::error::TxError;
use crate::event::ChainEvent;

/// What a successful call returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Bool(bool),
    UInt(u128),
}

/// A rejected call: the refusing contract's code and a description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TxFailure {
    pub code: u32,
    pub contract: &'static str,
    pub message: String,
}

impl From<&TxError> for TxFailure {
    fn from(err: &TxError) -> Self {
        Self {
            code: err.code(),
            contract: err.contract(),
            message: err.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub result: Result<Value, TxFailure>,
    /// Events of an accepted call, in emission order per contract. Empty
    /// when the call failed.
    pub events: Vec<ChainEvent>,
}

impl Receipt {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn ok_bool(&self) -> Option<bool> {
        match self.result {
            Ok(Value::Bool(b)) => Some(b),
            _ => None,
        }
    }

    pub fn ok_uint(&self) -> Option<u128> {
        match self.result {
            Ok(Value::UInt(n)) => Some(n),
            _ => None,
        }
    }

    pub fn err_code(&self) -> Option<u32> {
        self.result.as_ref().err().map(|f| f.code)
    }
}

/// A mined block.
#[derive(Clone, Debug, Serialize)]
pub struct Block {
    /// Height the transactions ran at.
    pub height: BlockHeight,
    pub receipts: Vec<Receipt>,
}
