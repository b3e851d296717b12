//! Token issue and transfer scenarios.

#[cfg(test)]
mod tests {
    use crate::integration::contracts::{TestChain, CURRENCY};
    use shared_types::{Action, PermissionLevel, Transaction};
    use tl_controller::ControllerError;

    #[test]
    fn test_issue_then_transfer() {
        let mut chain = TestChain::new(&["alice", "bob"]);

        chain.push(&TestChain::issue_tx("alice", "10.0000 EOS")).unwrap();
        chain
            .push(&TestChain::transfer_tx("alice", "bob", "4.0000 EOS"))
            .unwrap();

        assert_eq!(chain.balance("alice"), TestChain::asset("6.0000 EOS"));
        assert_eq!(chain.balance("bob"), TestChain::asset("4.0000 EOS"));
    }

    #[test]
    fn test_overspend_rejected_and_rolled_back() {
        let mut chain = TestChain::new(&["alice", "bob"]);
        chain.push(&TestChain::issue_tx("alice", "10.0000 EOS")).unwrap();

        let err = chain
            .push(&TestChain::transfer_tx("alice", "bob", "20.0000 EOS"))
            .unwrap_err();

        match err {
            ControllerError::AssertionFailure { message, .. } => {
                assert_eq!(message, "integer underflow subtracting token balance");
            }
            other => panic!("expected assertion failure, got {other}"),
        }
        assert_eq!(chain.balance("alice"), TestChain::asset("10.0000 EOS"));
        assert_eq!(chain.balance("bob"), TestChain::asset("0.0000 EOS"));
    }

    #[test]
    fn test_transfer_requires_senders_authority() {
        let mut chain = TestChain::new(&["alice", "bob"]);
        chain.push(&TestChain::issue_tx("alice", "10.0000 EOS")).unwrap();

        // Same declared authorization, signed with bob's key instead.
        let forged = TestChain::transfer_tx("alice", "bob", "5.0000 EOS")
            .signed_by(vec![TestChain::active_key("bob")]);
        let err = chain.push(&forged).unwrap_err();

        assert!(matches!(err, ControllerError::AuthorizationFailure { .. }));
        assert_eq!(chain.balance("alice"), TestChain::asset("10.0000 EOS"));
    }

    #[test]
    fn test_multi_action_transaction_is_atomic() {
        let mut chain = TestChain::new(&["alice", "bob"]);
        chain.push(&TestChain::issue_tx("alice", "10.0000 EOS")).unwrap();

        // First action would succeed; the second overspends given the first.
        let good = TestChain::transfer_tx("alice", "bob", "8.0000 EOS");
        let bad = TestChain::transfer_tx("alice", "bob", "5.0000 EOS");
        let combined = Transaction::new(
            good.actions
                .into_iter()
                .chain(bad.actions)
                .collect::<Vec<Action>>(),
        )
        .signed_by(vec![TestChain::active_key("alice")]);

        let err = chain.push(&combined).unwrap_err();

        assert!(matches!(err, ControllerError::AssertionFailure { .. }));
        assert_eq!(chain.balance("alice"), TestChain::asset("10.0000 EOS"));
        assert_eq!(chain.balance("bob"), TestChain::asset("0.0000 EOS"));
    }

    #[test]
    fn test_issue_requires_contract_authority() {
        let mut chain = TestChain::new(&["alice"]);

        let forged = Transaction::new(vec![Action::new(
            CURRENCY,
            "issue",
            vec![PermissionLevel::new(CURRENCY, "active")],
            TestChain::issue_tx("alice", "10.0000 EOS").actions[0].data.clone(),
        )])
        .signed_by(vec![TestChain::active_key("alice")]);

        let err = chain.push(&forged).unwrap_err();
        assert!(matches!(err, ControllerError::AuthorizationFailure { .. }));
    }
}
