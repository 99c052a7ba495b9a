use rdpflow_cloud::CredentialStore;
use rdpflow_cloud_azure::{AzCli, DeletionWait, VmLifecycle, VmProfile};
use rdpflow_config::{ConfigError, Settings};
use std::sync::Arc;

/// Azure side of the app; needs a resource group
pub struct Azure {
    pub settings: Settings,
    pub lifecycle: Arc<VmLifecycle<AzCli>>,
}

impl Azure {
    fn new(settings: Settings) -> Self {
        let profile = VmProfile {
            image: settings.vm.image.clone(),
            size: settings.vm.size.clone(),
            public_ip_sku: settings.vm.public_ip_sku.clone(),
            custom_data: settings.vm.custom_data.clone(),
            rdp_port: settings.vm.rdp_port,
            ..VmProfile::default()
        };
        let lifecycle = VmLifecycle::new(
            AzCli::new(),
            &settings.resource_group,
            &settings.location,
        )
        .with_profile(profile)
        .with_deletion_wait(DeletionWait {
            interval: settings.deletion_interval,
            max_attempts: settings.deletion_max_attempts,
        });

        Self {
            settings,
            lifecycle: Arc::new(lifecycle),
        }
    }
}

/// Everything a command handler needs
///
/// The credential store is always available. Azure settings are resolved
/// up front but only checked by commands that talk to Azure, so `saved`,
/// `get` and `forget` work without a resource group.
pub struct App {
    pub store: Arc<CredentialStore>,
    azure: Result<Azure, ConfigError>,
}

impl App {
    pub async fn init() -> anyhow::Result<Self> {
        let store_path = Settings::load_store_path()?;
        let store = CredentialStore::load(&store_path).await?;

        let azure = Settings::load().map(Azure::new);
        match azure {
            Ok(ref azure) => match azure.settings.source {
                Some(ref path) => tracing::debug!("Loaded settings from {}", path.display()),
                None => tracing::debug!("No settings file found, using environment only"),
            },
            Err(ref e) => tracing::debug!("Azure settings unavailable: {}", e),
        }

        Ok(Self {
            store: Arc::new(store),
            azure,
        })
    }

    /// Azure settings and lifecycle, once `az` is confirmed installed
    pub async fn azure(&self) -> anyhow::Result<&Azure> {
        let azure = self
            .azure
            .as_ref()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        azure.lifecycle.gateway().check_installed().await?;
        Ok(azure)
    }
}
