//! Opened site shared by the mutating commands.

use anyhow::{Context as _, Result};

use crate::cli::Globals;
use crate::core::config::{Config, Settings};
use crate::core::permission::GrantList;
use crate::engine::{Actor, Context, Synchronizer};
use crate::store::FileStore;
use crate::ui::output;

/// A locked site plus everything the engine needs to act on it.
pub struct Session {
    pub store: FileStore,
    pub settings: Settings,
    pub ctx: Context,
    /// Edit grants of the acting user, from the site document.
    pub oracle: GrantList,
}

impl Session {
    /// Load config, then lock and load the site document.
    pub fn open(globals: &Globals) -> Result<Self> {
        let loaded = Config::load(Some(&globals.site_dir())).context("Failed to load config")?;
        for warning in &loaded.warnings {
            output::warn(
                format!("{} ({})", warning.message, warning.path.display()),
                globals.verbosity,
            );
        }
        let settings = loaded.config.settings();

        let store = FileStore::open(&globals.site).with_context(|| {
            format!("Failed to open site '{}'", globals.site.display())
        })?;

        let actor = if settings.admins.iter().any(|admin| admin == &globals.actor) {
            Actor::admin(globals.actor.as_str())
        } else {
            Actor::editor(globals.actor.as_str())
        };
        let mut ctx = Context::new(actor);
        if let Some(host) = &globals.host {
            ctx = ctx.with_host(host.as_str());
        }
        if globals.no_redirects {
            ctx = ctx.suppressing_redirects();
        }

        let oracle = GrantList::new(store.memory().grants_for(&globals.actor));
        tracing::debug!(
            actor = %globals.actor,
            admin = ctx.actor.admin,
            grants = oracle.granted().len(),
            "session opened"
        );

        Ok(Self {
            store,
            settings,
            ctx,
            oracle,
        })
    }

    /// A synchronizer over the session's site.
    pub fn synchronizer(&self) -> Synchronizer<'_> {
        let memory = self.store.memory();
        Synchronizer::new(memory, memory, &self.settings)
    }

    /// Write the site back.
    pub fn save(&self) -> Result<()> {
        self.store
            .flush()
            .with_context(|| format!("Failed to write site '{}'", self.store.path().display()))
    }
}
