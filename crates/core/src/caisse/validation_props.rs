//! Property-based tests for request validation and classification.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use agencia_shared::types::SupplierId;

use super::category::{CashCategory, OperationType};
use super::classify::{classify, LedgerEffect};
use super::error::CaisseError;
use super::request::{OperationDraft, OperationRequest};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default()
}

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

fn desk() -> impl Strategy<Value = OperationType> {
    prop_oneof![Just(OperationType::Entree), Just(OperationType::Sortie)]
}

fn any_category() -> impl Strategy<Value = CashCategory> {
    prop::sample::select(CashCategory::ALL.to_vec())
}

fn remission_type() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("solde".to_string())),
        Just(Some("dette".to_string())),
        Just(Some("exceptionnel".to_string())),
    ]
}

fn full_draft(category: CashCategory, montant: Decimal) -> OperationDraft {
    OperationDraft {
        montant: Some(montant),
        description: Some("prop".to_string()),
        categorie: Some(category.as_str().to_string()),
        fournisseur_id: Some(SupplierId::new()),
        ..OperationDraft::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Non-positive amounts never pass, whatever the category.
    #[test]
    fn prop_non_positive_amount_rejected(
        category in any_category(),
        montant in non_positive_amount(),
    ) {
        let result = OperationRequest::parse(
            full_draft(category, montant),
            category.operation_type(),
            today(),
        );
        prop_assert!(matches!(result, Err(CaisseError::NonPositiveAmount)), "got {:?}", result);
    }

    /// A category submitted on the wrong desk is always rejected.
    #[test]
    fn prop_wrong_desk_rejected(category in any_category(), montant in positive_amount()) {
        let wrong = match category.operation_type() {
            OperationType::Entree => OperationType::Sortie,
            OperationType::Sortie => OperationType::Entree,
        };
        let result = OperationRequest::parse(full_draft(category, montant), wrong, today());
        prop_assert!(
            matches!(result, Err(CaisseError::CategoryTypeMismatch { .. })),
            "got {:?}",
            result
        );
    }

    /// Only manual categories make it through the desk.
    #[test]
    fn prop_only_manual_categories_accepted(
        category in any_category(),
        desk in desk(),
        montant in positive_amount(),
    ) {
        let mut draft = full_draft(category, montant);
        draft.agent_id = Some(agencia_shared::types::AgentId::new());
        draft.client_id = Some(agencia_shared::types::ClientId::new());
        if let Ok(request) = OperationRequest::parse(draft, desk, today()) {
            prop_assert!(request.category.is_manual());
            prop_assert_eq!(request.category.operation_type(), desk);
        }
    }

    /// A supplier refund moves exactly one balance: the register when
    /// counted, a supplier balance otherwise.
    #[test]
    fn prop_supplier_refund_moves_one_balance(
        montant in positive_amount(),
        remission in remission_type(),
    ) {
        let mut draft = full_draft(CashCategory::RemboursementFournisseur, montant);
        draft.remboursement_type = remission;
        let request = OperationRequest::parse(draft, OperationType::Entree, today())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let plan = classify(&request);

        let ledger_side = matches!(
            plan.effect,
            LedgerEffect::SupplierCredit { .. } | LedgerEffect::SupplierDebt { .. }
        );
        prop_assert_eq!(plan.is_counted(), !ledger_side);
        prop_assert_eq!(plan.effect.moves_cash(), plan.is_counted());
    }
}
