//! Transaction builder — turns a function name and typed arguments into an
//! [`EntryFunctionCall`] against one fixed module.
//!
//! The target module is configuration, fixed when the builder is created;
//! every call it builds goes to that module. Building is pure: the same
//! inputs always produce equal calls, and nothing is signed or sent here.
//!
//! The builder checks structure only. Each value must fit its declared
//! wire type, and the function name must be a valid identifier. Whether a
//! pool or claim id actually exists is for the ledger to decide.

use crate::encoding::{validate_identifier, EncodingError};
use crate::types::{EntryFunctionCall, ModuleId, MoveValue, TypedArg};

/// Builds calls against a single module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBuilder {
    module: ModuleId,
}

impl TransactionBuilder {
    /// Create a builder for `module`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::InvalidIdentifier`] if the module name is not
    /// a valid Move identifier.
    pub fn new(module: ModuleId) -> Result<Self, EncodingError> {
        validate_identifier(&module.name)?;
        Ok(Self { module })
    }

    /// The module every built call targets.
    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    /// Build a call to `function` with `args`, in the given order.
    ///
    /// # Errors
    ///
    /// - [`EncodingError::InvalidIdentifier`]: bad function name.
    /// - [`EncodingError::OutOfRange`] / [`EncodingError::TypeMismatch`]: an
    ///   argument does not fit its wire type.
    pub fn build(
        &self,
        function: &str,
        args: &[TypedArg],
    ) -> Result<EntryFunctionCall, EncodingError> {
        validate_identifier(function)?;
        let args = args
            .iter()
            .map(TypedArg::to_move_value)
            .collect::<Result<Vec<MoveValue>, _>>()?;

        Ok(EntryFunctionCall {
            module: self.module.clone(),
            function: function.to_string(),
            args,
        })
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WireType;
    use securepool_agent_core::AccountAddress;

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new(ModuleId::new(
            AccountAddress::parse("0x1c6d89ac6b57c23e07ce431ea4e54ad340965d29aa4278c5767b211776361fc3")
                .unwrap(),
            "MicroInsurance",
        ))
        .unwrap()
    }

    #[test]
    fn builds_in_argument_order() {
        let call = builder()
            .build(
                "submit_claim",
                &[TypedArg::u64(3), TypedArg::u64(50), TypedArg::string("flood")],
            )
            .unwrap();
        assert_eq!(call.function(), "submit_claim");
        assert_eq!(
            call.args(),
            &[
                MoveValue::U64(3),
                MoveValue::U64(50),
                MoveValue::String("flood".into())
            ]
        );
        assert_eq!(
            call.signature(),
            vec![WireType::U64, WireType::U64, WireType::String]
        );
    }

    #[test]
    fn building_is_deterministic() {
        let args = [TypedArg::u64(7), TypedArg::bool(true)];
        let a = builder().build("vote_on_claim", &args).unwrap();
        let b = builder().build("vote_on_claim", &args).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn call_targets_configured_module() {
        let b = builder();
        let call = b.build("join_pool", &[TypedArg::u64(1)]).unwrap();
        assert_eq!(call.module(), b.module());
    }

    #[test]
    fn out_of_range_argument_fails() {
        let err = builder()
            .build("join_pool", &[TypedArg::u64(i128::from(u64::MAX) + 1)])
            .unwrap_err();
        assert!(matches!(err, EncodingError::OutOfRange { .. }));
    }

    #[test]
    fn invalid_function_name_fails() {
        assert_eq!(
            builder().build("join pool", &[]),
            Err(EncodingError::InvalidIdentifier("join pool".into()))
        );
    }

    #[test]
    fn invalid_module_name_rejected() {
        let module = ModuleId::new(AccountAddress::parse("0x1").unwrap(), "Micro-Insurance");
        assert!(TransactionBuilder::new(module).is_err());
    }
}
