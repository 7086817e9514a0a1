use crate::database::{Collection, JsonStore};
use crate::site::model::{SiteProfile, UpdateSiteRequest};
use crate::utils::error::CustomError;

#[derive(Debug, Clone)]
pub struct SiteService {
    store: JsonStore,
}

impl SiteService {
    pub fn new(store: JsonStore) -> Self {
        SiteService { store }
    }

    /// The stored profile, or the default one if none was saved yet.
    pub fn load(&self) -> Result<SiteProfile, CustomError> {
        Ok(self.store.load(Collection::Site)?)
    }

    pub fn update(&self, patch: UpdateSiteRequest) -> Result<SiteProfile, CustomError> {
        let mut site = self.load()?;
        patch.apply(&mut site);
        self.store.save(Collection::Site, &site)?;

        log::info!("site profile updated");
        Ok(site)
    }
}
