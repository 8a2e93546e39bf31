// src/pipeline/controller.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    models::{
        auth::Role,
        opportunity::{OpportunityView, Stage},
    },
    pipeline::{
        board::{resolve_drop, DropOutcome, PipelineBoard},
        client::ClientError,
        optimistic::OptimisticCache,
    },
    services::opportunity_service::MAX_LIST_LIMIT,
};

/// O que o quadro precisa do servidor.
#[async_trait]
pub trait OpportunityApi: Send + Sync {
    /// Uma página, mais recentes primeiro.
    async fn list_opportunities(&self, limit: i64, offset: i64) -> Result<Vec<OpportunityView>, ClientError>;
    async fn update_stage(&self, id: Uuid, stage: Stage) -> Result<OpportunityView, ClientError>;
}

#[derive(Debug)]
pub enum DropResult {
    /// Viewer: quadro somente leitura
    ReadOnly,
    /// Nenhum card ativo (sem drag_start, ou o card sumiu do cache)
    NoActiveItem,
    /// Mesma etapa ou alvo desconhecido: nenhuma requisição
    NoChange,
    Moved { id: Uuid, from: Stage, to: Stage },
    /// O servidor recusou; o cache voltou ao snapshot
    RolledBack { id: Uuid, error: ClientError },
}

pub struct PipelineController<A> {
    api: A,
    can_edit: bool,
    page_size: i64,
    cache: OptimisticCache<Vec<OpportunityView>>,
    active: Option<Uuid>,
}

impl<A: OpportunityApi> PipelineController<A> {
    pub fn new(api: A, role: Role) -> Self {
        Self {
            api,
            can_edit: role.satisfies(Role::Editor),
            page_size: MAX_LIST_LIMIT,
            cache: OptimisticCache::default(),
            active: None,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.clamp(1, MAX_LIST_LIMIT);
        self
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit
    }

    pub fn items(&self) -> &[OpportunityView] {
        self.cache.get()
    }

    pub fn board(&self) -> PipelineBoard {
        PipelineBoard::group(self.cache.get())
    }

    pub async fn load(&mut self) -> Result<PipelineBoard, ClientError> {
        let items = self.fetch_all().await?;
        self.cache.replace(items);
        Ok(self.board())
    }

    /// Marca o card arrastado. Não altera nada.
    pub fn drag_start(&mut self, id: Uuid) -> Option<&OpportunityView> {
        let item = self.cache.get().iter().find(|i| i.opportunity.id == id)?;
        self.active = Some(id);
        Some(item)
    }

    pub fn active(&self) -> Option<&OpportunityView> {
        let id = self.active?;
        self.cache.get().iter().find(|i| i.opportunity.id == id)
    }

    pub fn cancel_drag(&mut self) {
        self.active = None;
    }

    pub async fn drop_on(&mut self, target: &str) -> DropResult {
        let Some(active_id) = self.active.take() else {
            return DropResult::NoActiveItem;
        };
        if !self.can_edit {
            return DropResult::ReadOnly;
        }

        let Some(item) = self.cache.get().iter().find(|i| i.opportunity.id == active_id) else {
            return DropResult::NoActiveItem;
        };

        let (id, from, to) = match resolve_drop(&item.opportunity, target) {
            DropOutcome::Move { id, from, to } => (id, from, to),
            DropOutcome::SameStage | DropOutcome::UnknownTarget => return DropResult::NoChange,
        };

        let snapshot = self.cache.apply(|items| {
            if let Some(item) = items.iter_mut().find(|i| i.opportunity.id == id) {
                item.opportunity.stage = to;
            }
        });

        let result = match self.api.update_stage(id, to).await {
            Ok(_) => {
                self.cache.commit(snapshot);
                DropResult::Moved { id, from, to }
            }
            Err(error) => {
                tracing::warn!("Falha ao mover {} para {}: {}", id, to, error);
                self.cache.rollback(snapshot);
                DropResult::RolledBack { id, error }
            }
        };

        // Sempre reconcilia com o servidor, com sucesso ou não
        if let Err(e) = self.resync().await {
            tracing::warn!("Re-sincronização do quadro falhou: {}", e);
        }

        result
    }

    async fn resync(&mut self) -> Result<(), ClientError> {
        let items = self.fetch_all().await?;
        self.cache.replace(items);
        Ok(())
    }

    // Pagina até a primeira página incompleta: o quadro mostra todas as ativas
    async fn fetch_all(&self) -> Result<Vec<OpportunityView>, ClientError> {
        let mut items = Vec::new();
        loop {
            let page = self
                .api
                .list_opportunities(self.page_size, items.len() as i64)
                .await?;
            let done = (page.len() as i64) < self.page_size;
            items.extend(page);
            if done {
                return Ok(items);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::opportunity::Opportunity;
    use chrono::Utc;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    // API falsa: guarda a "verdade" do servidor e conta as chamadas.
    struct FakeApi {
        server: Mutex<Vec<OpportunityView>>,
        fail_updates: bool,
        fail_lists_after_load: bool,
        updates: AtomicUsize,
        lists: AtomicUsize,
    }

    impl FakeApi {
        fn new(items: Vec<OpportunityView>) -> Self {
            Self {
                server: Mutex::new(items),
                fail_updates: false,
                fail_lists_after_load: false,
                updates: AtomicUsize::new(0),
                lists: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl<'a> OpportunityApi for &'a FakeApi {
        async fn list_opportunities(&self, limit: i64, offset: i64) -> Result<Vec<OpportunityView>, ClientError> {
            let calls = self.lists.fetch_add(1, Ordering::SeqCst);
            if self.fail_lists_after_load && calls > 0 {
                return Err(api_error(500, "INTERNAL_SERVER_ERROR"));
            }
            let server = self.server.lock().unwrap();
            Ok(server
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn update_stage(&self, id: Uuid, stage: Stage) -> Result<OpportunityView, ClientError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self.fail_updates {
                return Err(api_error(403, "FORBIDDEN"));
            }
            let mut server = self.server.lock().unwrap();
            let item = server
                .iter_mut()
                .find(|i| i.opportunity.id == id)
                .ok_or_else(|| api_error(404, "NOT_FOUND"))?;
            item.opportunity.stage = stage;
            Ok(item.clone())
        }
    }

    fn api_error(status: u16, code: &str) -> ClientError {
        ClientError::Api {
            status,
            code: code.to_string(),
            message: "falhou".to_string(),
        }
    }

    fn view(stage: Stage) -> OpportunityView {
        let mut opportunity = Opportunity::new(Uuid::new_v4(), Utc::now());
        opportunity.stage = stage;
        OpportunityView {
            opportunity,
            customer_name: "Cliente".into(),
            vehicle_name: None,
        }
    }

    #[tokio::test]
    async fn successful_drop_moves_card_and_resyncs() {
        let item = view(Stage::New);
        let id = item.opportunity.id;
        let api = FakeApi::new(vec![item, view(Stage::Won)]);

        let mut controller = PipelineController::new(&api, Role::Editor);
        controller.load().await.unwrap();
        controller.drag_start(id).unwrap();

        let result = controller.drop_on("negotiation").await;
        assert!(matches!(
            result,
            DropResult::Moved { from: Stage::New, to: Stage::Negotiation, .. }
        ));
        assert_eq!(api.updates.load(Ordering::SeqCst), 1);
        assert_eq!(api.lists.load(Ordering::SeqCst), 2);

        let board = controller.board();
        assert_eq!(board.column(Stage::Negotiation).items.len(), 1);
        assert!(board.column(Stage::New).items.is_empty());
    }

    #[tokio::test]
    async fn same_stage_or_unknown_target_issues_no_request() {
        let item = view(Stage::Contacted);
        let id = item.opportunity.id;
        let api = FakeApi::new(vec![item]);

        let mut controller = PipelineController::new(&api, Role::Admin);
        controller.load().await.unwrap();

        controller.drag_start(id);
        assert!(matches!(controller.drop_on("contacted").await, DropResult::NoChange));
        controller.drag_start(id);
        assert!(matches!(controller.drop_on("archived").await, DropResult::NoChange));

        assert_eq!(api.updates.load(Ordering::SeqCst), 0);
        assert_eq!(api.lists.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_update_rolls_back_to_the_exact_snapshot() {
        let items = vec![view(Stage::New), view(Stage::Negotiation)];
        let id = items[0].opportunity.id;
        let mut api = FakeApi::new(items);
        api.fail_updates = true;
        // Re-sync também falha: o estado visível é só o do rollback
        api.fail_lists_after_load = true;

        let mut controller = PipelineController::new(&api, Role::Editor);
        controller.load().await.unwrap();
        let before = controller.items().to_vec();

        controller.drag_start(id);
        let result = controller.drop_on("won").await;

        match result {
            DropResult::RolledBack { id: failed, error } => {
                assert_eq!(failed, id);
                assert_eq!(error.code(), Some("FORBIDDEN"));
            }
            other => panic!("resultado inesperado: {other:?}"),
        }
        assert_eq!(controller.items(), before.as_slice());
        assert_eq!(api.lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn viewer_board_is_read_only() {
        let item = view(Stage::New);
        let id = item.opportunity.id;
        let api = FakeApi::new(vec![item]);

        let mut controller = PipelineController::new(&api, Role::Viewer);
        assert!(!controller.can_edit());
        controller.load().await.unwrap();

        controller.drag_start(id);
        assert!(matches!(controller.drop_on("won").await, DropResult::ReadOnly));
        assert_eq!(api.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn load_pages_until_every_active_item_is_in_the_cache() {
        let items: Vec<OpportunityView> = (0..5).map(|_| view(Stage::New)).collect();
        let api = FakeApi::new(items.clone());

        let mut controller = PipelineController::new(&api, Role::Viewer).with_page_size(2);
        let board = controller.load().await.unwrap();

        assert_eq!(board.column(Stage::New).items.len(), 5);
        assert_eq!(controller.items(), items.as_slice());
        // 2 + 2 + 1
        assert_eq!(api.lists.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn drop_without_drag_start_does_nothing() {
        let api = FakeApi::new(vec![view(Stage::New)]);
        let mut controller = PipelineController::new(&api, Role::Editor);
        controller.load().await.unwrap();

        assert!(controller.drag_start(Uuid::new_v4()).is_none());
        assert!(matches!(controller.drop_on("won").await, DropResult::NoActiveItem));
    }
}
