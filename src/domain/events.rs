use serde::{Deserialize, Serialize};

use crate::domain::model::{ActorId, PendingSigningRequest, PlayerEntry, PlayerRole, SigningKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Requested,
    Response,
    Confirmed,
    Dismissed,
    RoleChanged,
    TeamReset,
}

/// Everything the notification boundary can be asked to render flows
/// through this enum. Delivery is fire-and-forget: a failed send never
/// rolls back the state transition that produced the event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum WorkflowEvent {
    SigningRequested {
        request: PendingSigningRequest,
    },
    SigningResponse {
        request: PendingSigningRequest,
        accepted: bool,
    },
    SigningConfirmed {
        request: PendingSigningRequest,
        kind: SigningKind,
        confirmed_by: ActorId,
    },
    PlayerDismissed {
        modality: String,
        team: String,
        player: PlayerEntry,
        dismissed_by: ActorId,
        reason: Option<String>,
        voluntary: bool,
    },
    RoleChanged {
        modality: String,
        team: String,
        player_id: ActorId,
        old_role: Option<PlayerRole>,
        new_role: Option<PlayerRole>,
        changed_by: ActorId,
    },
    TeamReset {
        modality: String,
        team: String,
        reset_by: ActorId,
    },
}

impl WorkflowEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorkflowEvent::SigningRequested { .. } => EventKind::Requested,
            WorkflowEvent::SigningResponse { .. } => EventKind::Response,
            WorkflowEvent::SigningConfirmed { .. } => EventKind::Confirmed,
            WorkflowEvent::PlayerDismissed { .. } => EventKind::Dismissed,
            WorkflowEvent::RoleChanged { .. } => EventKind::RoleChanged,
            WorkflowEvent::TeamReset { .. } => EventKind::TeamReset,
        }
    }

    /// One-line audit rendering used by the webhook sink and the CLI log.
    pub fn audit_line(&self) -> String {
        fn role_text(role: &Option<PlayerRole>) -> String {
            role.map(|r| r.to_string()).unwrap_or_else(|| "player".to_string())
        }

        match self {
            WorkflowEvent::SigningRequested { request } => format!(
                "SIGNING REQUEST: {} wants to sign {} for {} ({})",
                request.requester_id, request.target_name, request.team, request.modality
            ),
            WorkflowEvent::SigningResponse { request, accepted } => format!(
                "SIGNING RESPONSE: {} {} the offer from {} ({})",
                request.target_name,
                if *accepted { "ACCEPTS" } else { "REJECTS" },
                request.team,
                request.modality
            ),
            WorkflowEvent::SigningConfirmed {
                request,
                kind,
                confirmed_by,
            } => format!(
                "SIGNING: {} joins {} (type: {}, role: {}). Confirmed by {}.",
                request.target_name,
                request.team,
                kind,
                role_text(&request.proposed_role),
                confirmed_by
            ),
            WorkflowEvent::PlayerDismissed {
                team,
                player,
                dismissed_by,
                reason,
                voluntary,
                ..
            } => {
                let reason = reason.as_deref().unwrap_or("not specified");
                if *voluntary {
                    format!(
                        "VOLUNTARY LEAVE: {} has left {}. Reason: {}",
                        player.display_name, team, reason
                    )
                } else {
                    format!(
                        "DISMISSAL: {} was dismissed from {} by {}. Reason: {}",
                        player.display_name, team, dismissed_by, reason
                    )
                }
            }
            WorkflowEvent::RoleChanged {
                team,
                player_id,
                old_role,
                new_role,
                changed_by,
                ..
            } => format!(
                "ROLE CHANGE: {} in {} went from {} to {}, changed by {}",
                player_id,
                team,
                role_text(old_role),
                role_text(new_role),
                changed_by
            ),
            WorkflowEvent::TeamReset {
                modality,
                team,
                reset_by,
            } => format!(
                "ROSTER RESET: {} ({}) was cleared for a new season by {}",
                team, modality, reset_by
            ),
        }
    }
}
