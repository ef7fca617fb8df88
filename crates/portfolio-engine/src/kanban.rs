//! Claims Kanban board
//!
//! Four columns keyed by claim status. Any column may move to any other; a
//! drop removes the claim from its source column and appends it to the
//! target with the status rewritten. Moves are local state. The returned
//! [`StatusChange`] is what a caller would send to the backend if it chooses
//! to persist the move.

use portfolio_types::{Claim, ClaimStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub claim_id: String,
    pub from: ClaimStatus,
    pub to: ClaimStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    Moved(StatusChange),
    NoOp,
}

impl DropOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, DropOutcome::Moved(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub status: ClaimStatus,
    pub label: &'static str,
    pub count: usize,
    pub total_incurred: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DragState {
    claim_id: String,
    source: ClaimStatus,
}

fn column_index(status: ClaimStatus) -> Option<usize> {
    ClaimStatus::COLUMNS.iter().position(|s| *s == status)
}

#[derive(Debug, Clone, Default)]
pub struct KanbanBoard {
    columns: [Vec<Claim>; 4],
    /// Claims whose status has no column; kept but never rendered
    unassigned: Vec<Claim>,
    dragging: Option<DragState>,
}

impl KanbanBoard {
    pub fn from_claims(claims: Vec<Claim>) -> Self {
        let mut board = Self::default();
        for claim in claims {
            match column_index(claim.status) {
                Some(idx) => board.columns[idx].push(claim),
                None => board.unassigned.push(claim),
            }
        }

        debug!(
            open = board.columns[0].len(),
            in_review = board.columns[1].len(),
            processing = board.columns[2].len(),
            closed = board.columns[3].len(),
            unassigned = board.unassigned.len(),
            "Built claims board"
        );
        board
    }

    pub fn column(&self, status: ClaimStatus) -> &[Claim] {
        match column_index(status) {
            Some(idx) => &self.columns[idx],
            None => &[],
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = (ClaimStatus, &[Claim])> {
        ClaimStatus::COLUMNS
            .iter()
            .zip(self.columns.iter())
            .map(|(status, claims)| (*status, claims.as_slice()))
    }

    pub fn unassigned(&self) -> &[Claim] {
        &self.unassigned
    }

    pub fn claim(&self, claim_id: &str) -> Option<&Claim> {
        self.columns
            .iter()
            .flatten()
            .chain(self.unassigned.iter())
            .find(|c| c.id == claim_id)
    }

    pub fn total_claims(&self) -> usize {
        self.columns.iter().map(Vec::len).sum::<usize>() + self.unassigned.len()
    }

    pub fn summary(&self) -> Vec<ColumnSummary> {
        self.columns()
            .map(|(status, claims)| ColumnSummary {
                status,
                label: status.label(),
                count: claims.len(),
                total_incurred: claims.iter().map(|c| c.amount_incurred).sum(),
            })
            .collect()
    }

    /// Begin dragging a card. Returns false when the claim is not on the board.
    pub fn drag_start(&mut self, claim_id: &str) -> bool {
        let source = self
            .columns()
            .find(|(_, claims)| claims.iter().any(|c| c.id == claim_id))
            .map(|(status, _)| status);

        match source {
            Some(source) => {
                self.dragging = Some(DragState {
                    claim_id: claim_id.to_string(),
                    source,
                });
                true
            }
            None => {
                self.dragging = None;
                false
            }
        }
    }

    /// Whether hovering over `target` should show a drop affordance
    pub fn drag_over(&self, target: ClaimStatus) -> bool {
        self.dragging.is_some() && target.is_column()
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_ref().map(|d| d.claim_id.as_str())
    }

    pub fn cancel_drag(&mut self) {
        self.dragging = None;
    }

    /// Finish a drag. Dropping on the source column, or with nothing dragged, is a no-op.
    pub fn drop(&mut self, target: ClaimStatus) -> DropOutcome {
        let Some(drag) = self.dragging.take() else {
            return DropOutcome::NoOp;
        };

        if drag.source == target {
            return DropOutcome::NoOp;
        }

        self.move_claim(&drag.claim_id, target)
    }

    /// Status change from the detail modal. Same move rule as a drop.
    pub fn set_status(&mut self, claim_id: &str, target: ClaimStatus) -> DropOutcome {
        self.move_claim(claim_id, target)
    }

    fn move_claim(&mut self, claim_id: &str, target: ClaimStatus) -> DropOutcome {
        let Some(target_idx) = column_index(target) else {
            return DropOutcome::NoOp;
        };

        let located = self.columns.iter().enumerate().find_map(|(idx, claims)| {
            claims
                .iter()
                .position(|c| c.id == claim_id)
                .map(|pos| (idx, pos))
        });

        let Some((source_idx, pos)) = located else {
            return DropOutcome::NoOp;
        };

        if source_idx == target_idx {
            return DropOutcome::NoOp;
        }

        let mut claim = self.columns[source_idx].remove(pos);
        let from = claim.status;
        claim.status = target;
        self.columns[target_idx].push(claim);

        info!(claim_id, %from, to = %target, "Moved claim");

        DropOutcome::Moved(StatusChange {
            claim_id: claim_id.to_string(),
            from,
            to: target,
        })
    }

    pub fn into_claims(self) -> Vec<Claim> {
        self.columns
            .into_iter()
            .flatten()
            .chain(self.unassigned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn claim(id: &str, status: ClaimStatus, amount: f64) -> Claim {
        Claim {
            id: id.to_string(),
            claim_number: format!("CLM-{}", id),
            property_id: "p1".to_string(),
            property_name: None,
            status,
            claim_type: "water_damage".to_string(),
            date_of_loss: None,
            date_reported: None,
            amount_incurred: amount,
            attachment_count: 0,
            has_alert: false,
        }
    }

    fn column_ids(board: &KanbanBoard, status: ClaimStatus) -> Vec<String> {
        board.column(status).iter().map(|c| c.id.clone()).collect()
    }

    fn sample_board() -> KanbanBoard {
        KanbanBoard::from_claims(vec![
            claim("c1", ClaimStatus::Open, 100.0),
            claim("c2", ClaimStatus::Open, 200.0),
            claim("c3", ClaimStatus::InReview, 300.0),
            claim("c4", ClaimStatus::Closed, 400.0),
            claim("c5", ClaimStatus::Unknown, 500.0),
        ])
    }

    #[test]
    fn test_groups_by_status_in_input_order() {
        let board = sample_board();
        assert_eq!(column_ids(&board, ClaimStatus::Open), vec!["c1", "c2"]);
        assert_eq!(column_ids(&board, ClaimStatus::InReview), vec!["c3"]);
        assert!(board.column(ClaimStatus::Processing).is_empty());
        assert_eq!(board.unassigned().len(), 1);
        assert_eq!(board.total_claims(), 5);
    }

    #[test]
    fn test_drop_moves_claim_to_end_of_target() {
        let mut board = sample_board();
        assert!(board.drag_start("c1"));
        assert!(board.drag_over(ClaimStatus::Closed));

        let outcome = board.drop(ClaimStatus::Closed);
        assert_eq!(
            outcome,
            DropOutcome::Moved(StatusChange {
                claim_id: "c1".to_string(),
                from: ClaimStatus::Open,
                to: ClaimStatus::Closed,
            })
        );
        assert_eq!(column_ids(&board, ClaimStatus::Open), vec!["c2"]);
        assert_eq!(column_ids(&board, ClaimStatus::Closed), vec!["c4", "c1"]);
        assert_eq!(board.claim("c1").unwrap().status, ClaimStatus::Closed);
        assert!(board.dragging().is_none());
    }

    #[test]
    fn test_drop_on_same_column_is_noop() {
        let mut board = sample_board();
        board.drag_start("c2");
        assert_eq!(board.drop(ClaimStatus::Open), DropOutcome::NoOp);
        assert_eq!(column_ids(&board, ClaimStatus::Open), vec!["c1", "c2"]);
    }

    #[test]
    fn test_drop_without_drag_is_noop() {
        let mut board = sample_board();
        assert!(!board.drag_over(ClaimStatus::Open));
        assert_eq!(board.drop(ClaimStatus::Processing), DropOutcome::NoOp);
    }

    #[test]
    fn test_backward_moves_are_allowed() {
        let mut board = sample_board();
        board.drag_start("c4");
        assert!(board.drop(ClaimStatus::Open).is_moved());
        assert_eq!(column_ids(&board, ClaimStatus::Open), vec!["c1", "c2", "c4"]);
    }

    #[test]
    fn test_unassigned_claims_cannot_be_dragged() {
        let mut board = sample_board();
        assert!(!board.drag_start("c5"));
        assert!(!board.drag_start("missing"));
    }

    #[test]
    fn test_set_status_from_modal() {
        let mut board = sample_board();
        assert!(board.set_status("c3", ClaimStatus::Processing).is_moved());
        assert_eq!(column_ids(&board, ClaimStatus::Processing), vec!["c3"]);
        assert_eq!(
            board.set_status("c3", ClaimStatus::Unknown),
            DropOutcome::NoOp
        );
    }

    #[test]
    fn test_summary_totals() {
        let board = sample_board();
        let summary = board.summary();
        assert_eq!(summary.len(), 4);
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[0].total_incurred, 300.0);
        assert_eq!(summary[2].label, "Processing");
    }

    #[test]
    fn test_into_claims_keeps_everything() {
        let board = sample_board();
        assert_eq!(board.into_claims().len(), 5);
    }
}
