use crate::core::market::MarketStateStore;
use crate::core::pending::PendingSigningRegistry;
use crate::core::roster::RosterStore;
use crate::core::{AuthorizationOracle, DocumentStore, NotificationSink};
use crate::domain::events::WorkflowEvent;
use crate::domain::model::{
    ActorId, MessageRef, PendingSigningRequest, PlayerEntry, PlayerRole, RequestId, RequestState,
    SigningKind,
};
use crate::utils::error::{MarketError, Result};
use chrono::Utc;

/// Outcome of a confirmed signing, carrying the applied kind for audit logs.
#[derive(Clone, Debug)]
pub struct ConfirmedSigning {
    pub request: PendingSigningRequest,
    pub team: String,
    pub kind: SigningKind,
}

/// Drives one signing request from creation through the target's response to
/// the official confirmation, consulting the market state to classify the
/// signing and the roster store to apply it.
///
/// One workflow step runs at a time; the registry removal in `confirm`
/// happens before any externally visible side effect, so a repeated confirm
/// finds the request gone and reports `RequestNotFound` instead of applying
/// the roster change twice.
pub struct SigningWorkflow<D, A, N>
where
    D: DocumentStore,
    A: AuthorizationOracle,
    N: NotificationSink,
{
    roster: RosterStore<D>,
    market: MarketStateStore<D>,
    pending: PendingSigningRegistry<D>,
    oracle: A,
    sink: N,
}

impl<D, A, N> SigningWorkflow<D, A, N>
where
    D: DocumentStore,
    A: AuthorizationOracle,
    N: NotificationSink,
{
    pub fn new(
        roster: RosterStore<D>,
        market: MarketStateStore<D>,
        pending: PendingSigningRegistry<D>,
        oracle: A,
        sink: N,
    ) -> Self {
        Self {
            roster,
            market,
            pending,
            oracle,
            sink,
        }
    }

    pub fn roster(&self) -> &RosterStore<D> {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut RosterStore<D> {
        &mut self.roster
    }

    pub fn market(&self) -> &MarketStateStore<D> {
        &self.market
    }

    pub fn market_mut(&mut self) -> &mut MarketStateStore<D> {
        &mut self.market
    }

    pub fn pending(&self) -> &PendingSigningRegistry<D> {
        &self.pending
    }

    fn authorize(&self, actor: &ActorId, modality: &str, team: &str, action: &str) -> Result<()> {
        if self.oracle.is_official(actor) || self.oracle.is_captain_of(actor, modality, team) {
            return Ok(());
        }
        Err(MarketError::Unauthorized {
            actor: actor.to_string(),
            action: action.to_string(),
        })
    }

    fn allocate_id(guild_id: &str, target: &ActorId) -> RequestId {
        RequestId(format!(
            "{guild_id}_{target}_{}",
            Utc::now().timestamp_millis()
        ))
    }

    /// Opens a signing request and parks it awaiting the target's response.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &mut self,
        requester: &ActorId,
        target: &ActorId,
        target_name: &str,
        guild_id: &str,
        modality: &str,
        team: &str,
        proposed_role: Option<PlayerRole>,
    ) -> Result<PendingSigningRequest> {
        // Signing yourself is only legal as an explicit leadership claim.
        if requester == target && proposed_role.is_none() {
            return Err(MarketError::Validation {
                message: "you can only sign yourself to claim the captain or vice-captain role"
                    .to_string(),
            });
        }

        let canonical = self.roster.resolve_team(modality, team)?;
        self.authorize(requester, modality, &canonical, "request a signing")?;

        if self.pending.find_live(target, modality, &canonical).is_some() {
            return Err(MarketError::DuplicateRequest {
                target: target.to_string(),
                team: canonical,
            });
        }

        let request = PendingSigningRequest {
            id: Self::allocate_id(guild_id, target),
            target_id: target.clone(),
            target_name: target_name.to_string(),
            requester_id: requester.clone(),
            guild_id: guild_id.to_string(),
            modality: modality.to_lowercase(),
            team: canonical,
            proposed_role,
            created_at: Utc::now(),
            state: RequestState::AwaitingTargetResponse,
            message_ref: None,
        };
        self.pending.create(request.clone()).await?;
        tracing::info!(id = %request.id, target = %request.target_id, team = %request.team,
            "signing request created");

        self.sink
            .notify(&WorkflowEvent::SigningRequested {
                request: request.clone(),
            })
            .await;
        Ok(request)
    }

    /// Records the rendered request message so later edits can find it.
    pub async fn attach_message(&mut self, id: &RequestId, message: MessageRef) -> Result<()> {
        self.pending.attach_message(id, message).await
    }

    /// Target accepts or rejects. Rejection is terminal and deletes the
    /// record; acceptance parks the request for an official, with the
    /// rosters untouched until confirmation.
    pub async fn respond(
        &mut self,
        id: &RequestId,
        responder: &ActorId,
        accepted: bool,
    ) -> Result<PendingSigningRequest> {
        let request = self
            .pending
            .get(id)
            .ok_or_else(|| MarketError::RequestNotFound(id.to_string()))?;
        if &request.target_id != responder {
            return Err(MarketError::Unauthorized {
                actor: responder.to_string(),
                action: "respond to this signing request".to_string(),
            });
        }

        let request = if accepted {
            self.pending
                .transition(
                    id,
                    RequestState::AwaitingTargetResponse,
                    RequestState::AwaitingOfficialConfirmation,
                )
                .await?
        } else {
            let request = request.clone();
            if request.state != RequestState::AwaitingTargetResponse {
                return Err(MarketError::UnexpectedRequestState {
                    id: id.to_string(),
                    expected: RequestState::AwaitingTargetResponse,
                    actual: request.state,
                });
            }
            self.pending.remove(id).await?;
            request
        };
        tracing::info!(id = %id, accepted, "signing request answered");

        self.sink
            .notify(&WorkflowEvent::SigningResponse {
                request: request.clone(),
                accepted,
            })
            .await;
        Ok(request)
    }

    /// Withdraws a live request. The requester, the target, and any official
    /// may cancel; nothing has touched the rosters yet, so nothing is undone.
    pub async fn cancel(&mut self, id: &RequestId, actor: &ActorId) -> Result<PendingSigningRequest> {
        let request = self
            .pending
            .get(id)
            .ok_or_else(|| MarketError::RequestNotFound(id.to_string()))?
            .clone();
        if &request.requester_id != actor
            && &request.target_id != actor
            && !self.oracle.is_official(actor)
        {
            return Err(MarketError::Unauthorized {
                actor: actor.to_string(),
                action: "cancel this signing request".to_string(),
            });
        }
        self.pending.remove(id).await?;
        tracing::info!(id = %id, actor = %actor, "signing request cancelled");
        Ok(request)
    }

    /// Official confirmation: classifies the signing by the current market
    /// phase and applies it to the roster.
    ///
    /// Every validation runs before any state changes, so a failed confirm
    /// leaves the request parked and retryable once the blocking condition
    /// (capacity, quota) clears. In particular the mid-season free-signing
    /// counter is only consumed after the capacity check has passed.
    pub async fn confirm(&mut self, id: &RequestId, official: &ActorId) -> Result<ConfirmedSigning> {
        let request = self
            .pending
            .get(id)
            .ok_or_else(|| MarketError::RequestNotFound(id.to_string()))?
            .clone();
        if !self.oracle.is_official(official) {
            return Err(MarketError::Unauthorized {
                actor: official.to_string(),
                action: "confirm signings".to_string(),
            });
        }
        if request.state != RequestState::AwaitingOfficialConfirmation {
            return Err(MarketError::UnexpectedRequestState {
                id: id.to_string(),
                expected: RequestState::AwaitingOfficialConfirmation,
                actual: request.state,
            });
        }

        let team = self.roster.resolve_team(&request.modality, &request.team)?;
        let kind = self.market.classify_signing(&request.modality)?;

        self.roster.check_capacity(&request.modality, &team)?;
        if let Some(location) = self.roster.find_player(&request.target_id) {
            return Err(MarketError::PlayerAlreadyEnrolled {
                player: request.target_id.to_string(),
                team: location.team,
            });
        }
        match kind {
            SigningKind::QuotaLimited => self.roster.check_article_quota(&request.modality, &team)?,
            SigningKind::FreeMidSeason => self.market.check_mid_season_quota(&request.modality)?,
            SigningKind::FreeUnlimited => {}
        }

        // All checks passed: retire the request before any visible side
        // effect so a duplicate confirm sees RequestNotFound.
        self.pending.remove(id).await?;

        if kind == SigningKind::FreeMidSeason {
            self.market
                .consume_mid_season_free_signing(&request.modality)
                .await?;
        }
        let entry = PlayerEntry {
            id: request.target_id.clone(),
            display_name: request.target_name.clone(),
            role: request.proposed_role,
            signing_kind: Some(kind),
        };
        self.roster.add_player(&request.modality, &team, entry).await?;
        tracing::info!(id = %id, team = %team, kind = %kind, official = %official,
            "signing confirmed");

        self.sink
            .notify(&WorkflowEvent::SigningConfirmed {
                request: request.clone(),
                kind,
                confirmed_by: official.clone(),
            })
            .await;
        Ok(ConfirmedSigning {
            request,
            team,
            kind,
        })
    }

    /// Captain-or-official removal of a player. The articles spent on the
    /// signing are not refunded.
    pub async fn dismiss_player(
        &mut self,
        actor: &ActorId,
        modality: &str,
        team: &str,
        player: &ActorId,
        reason: Option<String>,
    ) -> Result<PlayerEntry> {
        let canonical = self.roster.resolve_team(modality, team)?;
        self.authorize(actor, modality, &canonical, "dismiss players")?;

        let entry = self.roster.remove_player(modality, &canonical, player).await?;
        self.sink
            .notify(&WorkflowEvent::PlayerDismissed {
                modality: modality.to_lowercase(),
                team: canonical,
                player: entry.clone(),
                dismissed_by: actor.clone(),
                reason,
                voluntary: false,
            })
            .await;
        Ok(entry)
    }

    /// Self-service exit from whichever team the actor is enrolled in.
    pub async fn leave_team(
        &mut self,
        actor: &ActorId,
        reason: Option<String>,
    ) -> Result<PlayerEntry> {
        let location = self
            .roster
            .find_player(actor)
            .ok_or_else(|| MarketError::NotEnrolled {
                player: actor.to_string(),
            })?;

        let entry = self
            .roster
            .remove_player(&location.modality, &location.team, actor)
            .await?;
        self.sink
            .notify(&WorkflowEvent::PlayerDismissed {
                modality: location.modality,
                team: location.team,
                player: entry.clone(),
                dismissed_by: actor.clone(),
                reason,
                voluntary: true,
            })
            .await;
        Ok(entry)
    }

    /// Captain-or-official role change, reported with the old role for audit.
    pub async fn change_role(
        &mut self,
        actor: &ActorId,
        modality: &str,
        team: &str,
        player: &ActorId,
        role: Option<PlayerRole>,
    ) -> Result<(Option<PlayerRole>, Option<PlayerRole>)> {
        let canonical = self.roster.resolve_team(modality, team)?;
        self.authorize(actor, modality, &canonical, "change player roles")?;

        let (old, new) = self.roster.set_role(modality, &canonical, player, role).await?;
        self.sink
            .notify(&WorkflowEvent::RoleChanged {
                modality: modality.to_lowercase(),
                team: canonical,
                player_id: player.clone(),
                old_role: old,
                new_role: new,
                changed_by: actor.clone(),
            })
            .await;
        Ok((old, new))
    }

    /// Official-only roster reset for a fresh season.
    pub async fn reset_roster(&mut self, actor: &ActorId, modality: &str, team: &str) -> Result<()> {
        if !self.oracle.is_official(actor) {
            return Err(MarketError::Unauthorized {
                actor: actor.to_string(),
                action: "reset rosters".to_string(),
            });
        }
        let canonical = self.roster.resolve_team(modality, team)?;
        self.roster.reset_roster(modality, &canonical).await?;
        self.sink
            .notify(&WorkflowEvent::TeamReset {
                modality: modality.to_lowercase(),
                team: canonical,
                reset_by: actor.clone(),
            })
            .await;
        Ok(())
    }
}
