//! Client Module Tests
//!
//! ## Test Scopes
//! - **Types**: worker identity derivation and display forms.
//! - **Traits**: a minimal in-memory implementation exercising both traits
//!   and the in-band outcome variants.

#[cfg(test)]
mod tests {
    use crate::client::types::{
        Credential, GroupRef, InviteOutcome, JoinOutcome, Target, WorkerId,
    };
    use crate::client::{Connector, GroupClient};
    use anyhow::Result;
    use async_trait::async_trait;

    // ============================================================
    // TEST 1: Types
    // ============================================================

    #[test]
    fn test_worker_id_comes_from_the_credential_label() {
        let credential = Credential {
            label: "+34600111222".to_string(),
            session: "opaque".to_string(),
        };

        assert_eq!(credential.worker_id(), WorkerId("+34600111222".to_string()));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(WorkerId("+341".into()).to_string(), "+341");
        assert_eq!(GroupRef("@group".into()).to_string(), "@group");
        assert_eq!(Target("+491700".into()).to_string(), "+491700");
    }

    #[test]
    fn test_invite_outcome_variants_compare_by_content() {
        assert_eq!(
            InviteOutcome::RateLimited { wait_secs: 30 },
            InviteOutcome::RateLimited { wait_secs: 30 }
        );
        assert_ne!(
            InviteOutcome::RateLimited { wait_secs: 30 },
            InviteOutcome::RateLimited { wait_secs: 31 }
        );
        assert_ne!(InviteOutcome::Invited, InviteOutcome::NotFound);
    }

    // ============================================================
    // TEST 2: Trait seam
    // ============================================================

    struct EchoClient {
        member: bool,
    }

    #[async_trait]
    impl GroupClient for EchoClient {
        async fn join_group(&mut self, _group: &GroupRef) -> Result<JoinOutcome> {
            if self.member {
                Ok(JoinOutcome::AlreadyMember)
            } else {
                self.member = true;
                Ok(JoinOutcome::Joined)
            }
        }

        async fn invite(&mut self, _group: &GroupRef, target: &Target) -> InviteOutcome {
            if target.0.ends_with('9') {
                InviteOutcome::NotFound
            } else {
                InviteOutcome::Invited
            }
        }

        async fn disconnect(&mut self) {}
    }

    struct EchoConnector;

    #[async_trait]
    impl Connector for EchoConnector {
        type Client = EchoClient;

        async fn connect(&self, _credential: &Credential) -> Result<EchoClient> {
            Ok(EchoClient { member: false })
        }
    }

    #[tokio::test]
    async fn test_rejoining_reports_already_member_as_success() {
        // ARRANGE
        let connector = EchoConnector;
        let credential = Credential {
            label: "+34".into(),
            session: "s".into(),
        };
        let group = GroupRef("@g".into());

        // ACT
        let mut client = connector.connect(&credential).await.unwrap();
        let first = client.join_group(&group).await.unwrap();
        let second = client.join_group(&group).await.unwrap();

        // ASSERT: both are successes, distinguished only by variant
        assert_eq!(first, JoinOutcome::Joined);
        assert_eq!(second, JoinOutcome::AlreadyMember);
    }

    #[tokio::test]
    async fn test_invite_outcomes_are_in_band() {
        let mut client = EchoClient { member: true };
        let group = GroupRef("@g".into());

        let hit = client.invite(&group, &Target("+111".into())).await;
        let miss = client.invite(&group, &Target("+119".into())).await;

        assert_eq!(hit, InviteOutcome::Invited);
        assert_eq!(miss, InviteOutcome::NotFound);
    }
}
