//! # Catalog Service
//!
//! Drives the deal list screen. It owns a [`DealCatalogView`], keeps it fed
//! from the repository's accumulated-deals channel, and publishes every
//! change as a [`ListUiState`] on a watch channel.
//!
//! Each emission from the repository replaces the working snapshot and
//! re-runs the whole pipeline. Search keystrokes are debounced; every other
//! query change recomputes right away. Votes and saves go to the repository
//! and show up through the next emission.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info, warn};
use shared::{ApiResponse, Coordinates, VoteType};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::domain::catalog_view::{CatalogQuery, DealCatalogView};
use crate::domain::debounce::Debouncer;
use crate::domain::models::{CustomFilterUpdate, PresetFilter, RestaurantDeals, SortKey};
use crate::io::RestaurantDealMapper;
use crate::storage::traits::{AuthRepository, RestaurantDealsRepository};

/// What the list screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListUiState {
    pub restaurants: Vec<RestaurantDeals>,
    pub query: CatalogQuery,
    pub is_loading: bool,
    pub show_filter_dialog: bool,
}

/// Result of a vote or save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    /// Guest user; the caller should prompt for sign-in
    SignInRequired,
    Failed(String),
}

struct Inner {
    deals: Arc<dyn RestaurantDealsRepository>,
    auth: Arc<dyn AuthRepository>,
    mapper: RestaurantDealMapper,
    view: Mutex<DealCatalogView>,
    state: watch::Sender<ListUiState>,
}

impl Inner {
    fn lock_view(&self) -> MutexGuard<'_, DealCatalogView> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `update` on the view and publishes the result.
    fn update_view<R>(&self, update: impl FnOnce(&mut DealCatalogView) -> R) -> R {
        let mut view = self.lock_view();
        let result = update(&mut view);
        self.state.send_modify(|state| {
            state.restaurants = view.visible().to_vec();
            state.query = view.query().clone();
        });
        result
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_modify(|state| state.is_loading = is_loading);
    }
}

pub struct CatalogService {
    inner: Arc<Inner>,
    debouncer: Debouncer,
    listener: JoinHandle<()>,
    default_location: Coordinates,
    default_radius_meters: f64,
}

impl CatalogService {
    /// Starts listening to `deals`. Must be called from within a tokio runtime.
    pub fn new(
        deals: Arc<dyn RestaurantDealsRepository>,
        auth: Arc<dyn AuthRepository>,
        config: &ClientConfig,
    ) -> Self {
        let (state, _) = watch::channel(ListUiState::default());
        let inner = Arc::new(Inner {
            deals,
            auth,
            mapper: RestaurantDealMapper::new(config.image_base_url.clone()),
            view: Mutex::new(DealCatalogView::new()),
            state,
        });

        let listener = tokio::spawn(listen(inner.clone()));

        Self {
            inner,
            debouncer: Debouncer::new(config.search_debounce()),
            listener,
            default_location: config.default_location,
            default_radius_meters: config.default_radius_meters,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListUiState> {
        self.inner.state.subscribe()
    }

    pub fn current_state(&self) -> ListUiState {
        self.inner.state.borrow().clone()
    }

    /// Fetches deals around `location`. Failures are logged and leave the
    /// catalog as it was.
    pub async fn refresh(&self, location: Coordinates, radius_meters: f64) {
        self.inner
            .update_view(|view| view.set_reference_location(Some(location)));
        self.inner.set_loading(true);

        let user_id = self.inner.auth.current_user().map(|user| user.id);
        if let Err(e) = self
            .inner
            .deals
            .fetch_deals(location, radius_meters, user_id.as_deref())
            .await
        {
            error!("Failed to fetch deals around {:?}: {}", location, e);
        }

        self.inner.set_loading(false);
    }

    /// Refresh around the configured fallback location, for when the device
    /// location is unknown.
    pub async fn refresh_default(&self) {
        self.refresh(self.default_location, self.default_radius_meters).await;
    }

    /// Stores the text now and recomputes once typing pauses.
    pub fn on_search_text_change(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.update_view(|view| view.set_search_text(text));

        let inner = self.inner.clone();
        self.debouncer.schedule(async move {
            inner.update_view(|view| {
                view.apply_filters();
            });
        });
    }

    pub fn apply_filters(&self) {
        self.inner.update_view(|view| {
            view.apply_filters();
        });
    }

    /// Selects a preset by its label ("All", "BOGO", "Discount", "Free", "Custom").
    pub fn select_preset(&self, name: &str) {
        match name.parse::<PresetFilter>() {
            Ok(preset) => self.inner.update_view(|view| {
                view.select_preset(preset);
            }),
            Err(e) => warn!("{}", e),
        }
    }

    /// Selects a sort key by name ("None", "Distance", "DatePosted", "UpVotes").
    pub fn set_sort_key(&self, name: &str) {
        match name.parse::<SortKey>() {
            Ok(sort_key) => self.inner.update_view(|view| {
                view.set_sort_key(sort_key);
            }),
            Err(e) => warn!("{}", e),
        }
    }

    /// Merges a filter-dialog change without applying it.
    pub fn set_custom_filter(&self, update: CustomFilterUpdate) {
        self.inner.update_view(|view| view.set_custom_filter(update));
    }

    /// Activates the custom filter and closes the dialog.
    pub fn submit_custom_filter(&self) {
        self.inner.update_view(|view| {
            view.submit_custom_filter();
        });
        self.show_filter_dialog(false);
    }

    pub fn show_filter_dialog(&self, visible: bool) {
        self.inner
            .state
            .send_modify(|state| state.show_filter_dialog = visible);
    }

    pub async fn vote(&self, deal_id: &str, vote: VoteType) -> ActionOutcome {
        let Some(user) = self.inner.auth.current_user() else {
            return ActionOutcome::SignInRequired;
        };

        debug!("User {} votes {:?} on {}", user.id, vote, deal_id);
        outcome(self.inner.deals.update_vote(deal_id, &user.id, vote).await)
    }

    /// Saves the deal, or unsaves it if the user already saved it.
    pub async fn toggle_save(&self, deal_id: &str) -> ActionOutcome {
        let Some(user) = self.inner.auth.current_user() else {
            return ActionOutcome::SignInRequired;
        };

        let saved = self
            .inner
            .lock_view()
            .snapshot()
            .iter()
            .flat_map(|restaurant| restaurant.deals.iter())
            .find(|deal| deal.id == deal_id)
            .map(|deal| deal.user_saved);
        let Some(saved) = saved else {
            return ActionOutcome::Failed(format!("Deal {} not found", deal_id));
        };

        let result = if saved {
            self.inner.deals.unsave_deal(deal_id, &user.id).await
        } else {
            self.inner.deals.save_deal(deal_id, &user.id).await
        };
        outcome(result)
    }
}

impl Drop for CatalogService {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

fn outcome(result: anyhow::Result<ApiResponse>) -> ActionOutcome {
    match result {
        Ok(response) if response.success => ActionOutcome::Done,
        Ok(response) => ActionOutcome::Failed(response.message),
        Err(e) => {
            error!("Deal action failed: {}", e);
            ActionOutcome::Failed(e.to_string())
        }
    }
}

/// Replaces the snapshot on every emission, starting with the current one.
async fn listen(inner: Arc<Inner>) {
    let mut receiver = inner.deals.accumulated_deals();
    loop {
        let snapshot = inner.mapper.to_domain_list(&receiver.borrow_and_update());
        debug!("Received {} restaurants", snapshot.len());
        inner.update_view(|view| {
            view.replace_snapshot(snapshot);
        });

        if receiver.changed().await.is_err() {
            info!("Deals feed closed");
            break;
        }
    }
}
