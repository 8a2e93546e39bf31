// src/pipeline.rs
//
// Modelo de visão do quadro Kanban de oportunidades, do lado do cliente:
// agrupamento por etapa, arrastar e soltar, mutação otimista com rollback.

pub mod board;
pub use board::{resolve_drop, DropOutcome, PipelineBoard, StageColumn};
pub mod optimistic;
pub use optimistic::{OptimisticCache, Snapshot};
pub mod controller;
pub use controller::{DropResult, OpportunityApi, PipelineController};
pub mod client;
pub use client::{AdminClient, ClientError};
