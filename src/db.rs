pub mod customer_repo;
pub use customer_repo::{CustomerRepository, PgCustomerRepository};
pub mod opportunity_repo;
pub use opportunity_repo::{OpportunityRepository, PgOpportunityRepository};
pub mod vehicle_repo;
pub use vehicle_repo::{PgVehicleRepository, VehicleRepository};
pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};
pub mod memory;
pub use memory::MemoryStore;

use std::{sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

// As quatro coleções, já atrás das traits. Os services recebem daqui.
#[derive(Clone)]
pub struct Repositories {
    pub opportunities: Arc<dyn OpportunityRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            opportunities: Arc::new(PgOpportunityRepository::new(pool.clone())),
            customers: Arc::new(PgCustomerRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            opportunities: store.clone(),
            customers: store.clone(),
            vehicles: store.clone(),
            users: store,
        }
    }
}

/// Conecta ao Postgres e roda as migrações.
pub async fn connect_postgres(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    sqlx::migrate!().run(&pool).await?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    Ok(pool)
}
