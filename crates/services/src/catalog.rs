use std::sync::Arc;

use pd_core::Clock;
use pd_core::filter::ModuleFilter;
use pd_core::model::{Material, ModuleDraft, ModuleError, ModuleId, PdModule};
use storage::repository::ModuleRepository;

use crate::error::CatalogServiceError;
use crate::fault::FaultInjector;

/// Platform-admin management of PD modules and their materials.
#[derive(Clone)]
pub struct PdCatalogService {
    clock: Clock,
    modules: Arc<dyn ModuleRepository>,
    faults: FaultInjector,
}

impl PdCatalogService {
    #[must_use]
    pub fn new(clock: Clock, modules: Arc<dyn ModuleRepository>) -> Self {
        Self {
            clock,
            modules,
            faults: FaultInjector::never(),
        }
    }

    #[must_use]
    pub fn with_faults(mut self, faults: FaultInjector) -> Self {
        self.faults = faults;
        self
    }

    /// Creates a draft module.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Module` for invalid drafts.
    pub async fn create(&self, draft: ModuleDraft) -> Result<PdModule, CatalogServiceError> {
        let module = PdModule::new(ModuleId::new(0), draft, self.clock.now())?;
        self.faults.run("create module").await?;
        let id = self.modules.insert_module(&module).await?;
        tracing::info!(module = %id, "module created");
        Ok(module.with_id(id))
    }

    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub async fn get(&self, id: ModuleId) -> Result<PdModule, CatalogServiceError> {
        self.modules
            .get_module(id)
            .await?
            .ok_or(CatalogServiceError::NotFound(id))
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list(&self, filter: &ModuleFilter) -> Result<Vec<PdModule>, CatalogServiceError> {
        let modules = self.modules.list_modules().await?;
        Ok(filter.apply(&modules).into_iter().cloned().collect())
    }

    /// # Errors
    ///
    /// Returns `NotFound`, or `Module` when the module is archived or the draft is invalid.
    pub async fn update(
        &self,
        id: ModuleId,
        draft: ModuleDraft,
    ) -> Result<PdModule, CatalogServiceError> {
        self.mutate(id, "update module", |module| module.update(draft))
            .await
    }

    /// # Errors
    ///
    /// Returns `NotFound`, or `Module(Archived)`.
    pub async fn add_material(
        &self,
        id: ModuleId,
        material: Material,
    ) -> Result<PdModule, CatalogServiceError> {
        self.mutate(id, "add material", |module| module.add_material(material))
            .await
    }

    /// # Errors
    ///
    /// Returns `Module(NoMaterials)` or `Module(InvalidTransition)`.
    pub async fn publish(&self, id: ModuleId) -> Result<PdModule, CatalogServiceError> {
        let module = self.mutate(id, "publish module", PdModule::publish).await?;
        tracing::info!(module = %id, "module published");
        Ok(module)
    }

    /// # Errors
    ///
    /// Returns `Module(InvalidTransition)` if already archived.
    pub async fn archive(&self, id: ModuleId) -> Result<PdModule, CatalogServiceError> {
        self.mutate(id, "archive module", PdModule::archive).await
    }

    async fn mutate(
        &self,
        id: ModuleId,
        operation: &'static str,
        change: impl FnOnce(&mut PdModule) -> Result<(), ModuleError>,
    ) -> Result<PdModule, CatalogServiceError> {
        let mut module = self.get(id).await?;
        change(&mut module)?;
        self.faults.run(operation).await?;
        self.modules.update_module(&module).await?;
        Ok(module)
    }
}
