// src/pipeline/board.rs

use serde::Serialize;
use uuid::Uuid;

use crate::models::opportunity::{Opportunity, OpportunityView, Stage};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageColumn {
    pub stage: Stage,
    pub items: Vec<OpportunityView>,
}

/// Sempre cinco colunas, na ordem das etapas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineBoard {
    pub columns: Vec<StageColumn>,
}

impl PipelineBoard {
    /// Particiona a lista nas colunas, preservando a ordem de origem dentro de cada uma.
    pub fn group(items: &[OpportunityView]) -> Self {
        let mut columns: Vec<StageColumn> = Stage::ALL
            .into_iter()
            .map(|stage| StageColumn {
                stage,
                items: Vec::new(),
            })
            .collect();

        for item in items {
            columns[item.opportunity.stage.index()].items.push(item.clone());
        }

        Self { columns }
    }

    pub fn column(&self, stage: Stage) -> &StageColumn {
        &self.columns[stage.index()]
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(|c| c.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Move { id: Uuid, from: Stage, to: Stage },
    SameStage,
    UnknownTarget,
}

/// Decide se soltar um card numa coluna gera uma requisição.
/// Só gera quando o alvo é uma etapa conhecida e diferente da atual.
pub fn resolve_drop(item: &Opportunity, target: &str) -> DropOutcome {
    match Stage::parse(target) {
        None => DropOutcome::UnknownTarget,
        Some(stage) if stage == item.stage => DropOutcome::SameStage,
        Some(stage) => DropOutcome::Move {
            id: item.id,
            from: item.stage,
            to: stage,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn view(stage: Stage, name: &str) -> OpportunityView {
        let mut opportunity = Opportunity::new(Uuid::new_v4(), Utc::now());
        opportunity.stage = stage;
        OpportunityView {
            opportunity,
            customer_name: name.into(),
            vehicle_name: None,
        }
    }

    #[test]
    fn group_partitions_into_five_ordered_columns() {
        let items = vec![
            view(Stage::Won, "a"),
            view(Stage::New, "b"),
            view(Stage::Won, "c"),
            view(Stage::New, "d"),
        ];
        let board = PipelineBoard::group(&items);

        let stages: Vec<Stage> = board.columns.iter().map(|c| c.stage).collect();
        assert_eq!(stages, Stage::ALL.to_vec());
        assert_eq!(board.len(), items.len());

        let names = |stage| -> Vec<String> {
            board.column(stage).items.iter().map(|i| i.customer_name.clone()).collect()
        };
        assert_eq!(names(Stage::New), vec!["b", "d"]);
        assert_eq!(names(Stage::Won), vec!["a", "c"]);
        assert!(board.column(Stage::Contacted).items.is_empty());
    }

    #[test]
    fn empty_list_still_has_every_column() {
        let board = PipelineBoard::group(&[]);
        assert_eq!(board.columns.len(), 5);
        assert!(board.is_empty());
    }

    #[test]
    fn drop_only_moves_to_a_different_known_stage() {
        let item = view(Stage::Contacted, "x").opportunity;

        assert_eq!(resolve_drop(&item, "contacted"), DropOutcome::SameStage);
        assert_eq!(resolve_drop(&item, "archived"), DropOutcome::UnknownTarget);
        assert_eq!(
            resolve_drop(&item, "won"),
            DropOutcome::Move {
                id: item.id,
                from: Stage::Contacted,
                to: Stage::Won
            }
        );
    }
}
