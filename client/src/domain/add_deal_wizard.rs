//! # Add-Deal Wizard
//!
//! Five linear steps for posting a deal:
//!
//! 1. pick the restaurant
//! 2. look at the deals it already has
//! 3. attach a photo
//! 4. item name, description, price and type
//! 5. availability, eligible groups and expiry, then submit
//!
//! Navigation only moves one step at a time and never resets the draft.
//! Submission is validated locally first; the repository is only called
//! once every check passes. Submitting does not change the step.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};
use shared::{AddDealResponse, AutoPopulateDealsResponse, Coordinates};

use crate::config::ClientConfig;
use crate::domain::deal_form::DealDraft;
use crate::domain::errors::AddDealError;
use crate::domain::models::{Deal, SelectedRestaurant};
use crate::io::RestaurantDealMapper;
use crate::storage::traits::{AuthRepository, ImageStorage, RestaurantDealsRepository};

pub const DEFAULT_IMAGE_KEY_PREFIX: &str = "deal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Step {
    #[default]
    Step1,
    Step2,
    Step3,
    Step4,
    Step5,
}

impl Step {
    /// Following step; `Step5` stays put.
    pub fn next(self) -> Self {
        match self {
            Step::Step1 => Step::Step2,
            Step::Step2 => Step::Step3,
            Step::Step3 => Step::Step4,
            Step::Step4 | Step::Step5 => Step::Step5,
        }
    }

    /// Preceding step; `Step1` stays put.
    pub fn prev(self) -> Self {
        match self {
            Step::Step1 | Step::Step2 => Step::Step1,
            Step::Step3 => Step::Step2,
            Step::Step4 => Step::Step3,
            Step::Step5 => Step::Step4,
        }
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

pub struct AddDealWizard {
    deals: Arc<dyn RestaurantDealsRepository>,
    images: Arc<dyn ImageStorage>,
    auth: Arc<dyn AuthRepository>,
    mapper: RestaurantDealMapper,
    image_key_prefix: String,
    step: Step,
    draft: DealDraft,
    /// `None` while a search is pending or before the first one
    restaurant_results: Option<Vec<SelectedRestaurant>>,
    last_search_keyword: Option<String>,
    existing_deals: Vec<Deal>,
    last_submission: Option<Result<AddDealResponse, AddDealError>>,
}

impl AddDealWizard {
    pub fn new(
        deals: Arc<dyn RestaurantDealsRepository>,
        images: Arc<dyn ImageStorage>,
        auth: Arc<dyn AuthRepository>,
    ) -> Self {
        Self {
            deals,
            images,
            auth,
            mapper: RestaurantDealMapper::default(),
            image_key_prefix: DEFAULT_IMAGE_KEY_PREFIX.to_string(),
            step: Step::default(),
            draft: DealDraft::default(),
            restaurant_results: None,
            last_search_keyword: None,
            existing_deals: Vec::new(),
            last_submission: None,
        }
    }

    /// Applies the image settings from `config`.
    pub fn configured(self, config: &ClientConfig) -> Self {
        self.with_mapper(RestaurantDealMapper::new(config.image_base_url.clone()))
            .with_image_key_prefix(config.image_key_prefix.clone())
    }

    pub fn with_mapper(mut self, mapper: RestaurantDealMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_image_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_key_prefix = prefix.into();
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &DealDraft {
        &self.draft
    }

    pub fn restaurant_results(&self) -> Option<&[SelectedRestaurant]> {
        self.restaurant_results.as_deref()
    }

    pub fn existing_deals(&self) -> &[Deal] {
        &self.existing_deals
    }

    pub fn last_submission(&self) -> Option<&Result<AddDealResponse, AddDealError>> {
        self.last_submission.as_ref()
    }

    pub fn next_step(&mut self) -> Step {
        self.step = self.step.next();
        self.step
    }

    pub fn prev_step(&mut self) -> Step {
        self.step = self.step.prev();
        self.step
    }

    pub fn update_draft(&mut self, update: impl FnOnce(&mut DealDraft)) {
        update(&mut self.draft);
    }

    /// Switching restaurants forgets the previous one's deal list.
    pub fn select_restaurant(&mut self, restaurant: SelectedRestaurant) {
        if self.draft.restaurant.as_ref().map(|r| &r.place_id) != Some(&restaurant.place_id) {
            self.existing_deals.clear();
        }
        self.draft.restaurant = Some(restaurant);
    }

    /// See [`DealDraft::set_price`].
    pub fn set_price(&mut self, text: &str) -> bool {
        self.draft.set_price(text)
    }

    pub fn apply_suggestions(&mut self, response: &AutoPopulateDealsResponse) {
        self.draft.apply_suggestions(response);
    }

    /// Whether the submit button should be enabled.
    pub fn can_submit(&self) -> bool {
        self.step == Step::Step5 && self.draft.is_complete()
    }

    /// Looks up restaurants for step 1. Repeating the previous keyword is a no-op.
    pub async fn search_restaurants(
        &mut self,
        keyword: &str,
        location: Coordinates,
        radius_meters: f64,
    ) -> Result<(), AddDealError> {
        if self.last_search_keyword.as_deref() == Some(keyword) {
            return Ok(());
        }
        self.last_search_keyword = Some(keyword.to_string());
        self.restaurant_results = None;

        match self.deals.search_nearby_restaurants(keyword, location, radius_meters).await {
            Ok(restaurants) => {
                self.restaurant_results = Some(
                    restaurants
                        .into_iter()
                        .map(RestaurantDealMapper::to_selected_restaurant)
                        .collect(),
                );
                Ok(())
            }
            Err(e) => {
                error!("Restaurant search for {:?} failed: {}", keyword, e);
                self.restaurant_results = Some(Vec::new());
                self.last_search_keyword = None;
                Err(AddDealError::from_repository(e))
            }
        }
    }

    /// Loads the deals the selected restaurant already has, for step 2.
    pub async fn load_existing_deals(&mut self) -> Result<(), AddDealError> {
        let Some(place_id) = self.draft.restaurant.as_ref().map(|r| r.place_id.clone()) else {
            warn!("No restaurant selected, nothing to load");
            self.existing_deals.clear();
            return Ok(());
        };

        match self.deals.get_restaurant(&place_id).await {
            Ok(restaurant) => {
                self.existing_deals = restaurant
                    .map(|restaurant| self.mapper.to_domain(&restaurant).deals)
                    .unwrap_or_default();
                Ok(())
            }
            Err(e) => {
                error!("Loading deals for {} failed: {}", place_id, e);
                Err(AddDealError::from_repository(e))
            }
        }
    }

    /// Uploads the photo for step 3 and keeps its storage key in the draft.
    pub async fn attach_image(&mut self, local_file: &Path) -> Result<String, AddDealError> {
        let user = self.auth.current_user().ok_or(AddDealError::SignInRequired)?;
        let key = format!(
            "{}_{}_{}",
            self.image_key_prefix,
            user.id,
            Utc::now().timestamp_millis()
        );

        let url = self
            .images
            .upload_image(&key, local_file)
            .await
            .map_err(AddDealError::from_repository)?;

        info!("Attached image {} as {}", local_file.display(), key);
        self.draft.image_path = Some(local_file.to_path_buf());
        self.draft.image_key = Some(key);
        Ok(url)
    }

    pub fn remove_image(&mut self) {
        self.draft.image_path = None;
    }

    /// Validates and posts the draft. Only allowed from the last step.
    pub async fn submit(&mut self) -> Result<AddDealResponse, AddDealError> {
        let result = self.try_submit().await;
        match &result {
            Ok(response) => info!("Deal {} posted", response.deal_id),
            Err(e) => warn!("Deal submission failed: {}", e),
        }
        self.last_submission = Some(result.clone());
        result
    }

    async fn try_submit(&self) -> Result<AddDealResponse, AddDealError> {
        if self.step != Step::Step5 {
            return Err(AddDealError::NotAtFinalStep);
        }
        let user = self.auth.current_user().ok_or(AddDealError::SignInRequired)?;
        let request = self.draft.to_request(&user.id, Utc::now())?;

        self.deals
            .add_deal(request)
            .await
            .map_err(AddDealError::from_repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ValidationError;
    use crate::domain::models::{DayOfWeek, User};
    use crate::storage::memory::{
        sample_restaurants, InMemoryAuthRepository, InMemoryDealsRepository, InMemoryImageStorage,
    };
    use shared::{ApplicableGroup, DealType};

    struct Fixture {
        deals: Arc<InMemoryDealsRepository>,
        images: Arc<InMemoryImageStorage>,
        auth: Arc<InMemoryAuthRepository>,
        wizard: AddDealWizard,
    }

    fn user() -> User {
        User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Tan".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    fn fixture() -> Fixture {
        let deals = Arc::new(InMemoryDealsRepository::new(sample_restaurants()));
        let images = Arc::new(InMemoryImageStorage::new());
        let auth = Arc::new(InMemoryAuthRepository::signed_in(user()));
        let wizard = AddDealWizard::new(deals.clone(), images.clone(), auth.clone());
        Fixture {
            deals,
            images,
            auth,
            wizard,
        }
    }

    fn mcd() -> SelectedRestaurant {
        SelectedRestaurant {
            place_id: "placeId_123".to_string(),
            restaurant_name: "MCD".to_string(),
            display_address: Some("123 Park Road".to_string()),
            coordinates: Coordinates::new(1.35, 103.87),
            image_url: None,
        }
    }

    fn go_to_step5(wizard: &mut AddDealWizard) {
        for _ in 0..4 {
            wizard.next_step();
        }
    }

    fn fill_valid_draft(wizard: &mut AddDealWizard) {
        wizard.select_restaurant(mcd());
        wizard.update_draft(|draft| {
            draft.item = "Nuggets".to_string();
            draft.deal_type = Some(DealType::Bogo);
        });
    }

    #[test]
    fn test_step_transitions_are_bounded() {
        assert_eq!(Step::Step1.prev(), Step::Step1);
        assert_eq!(Step::Step5.next(), Step::Step5);
        assert_eq!(Step::Step3.next(), Step::Step4);
        assert_eq!(Step::Step3.prev(), Step::Step2);
        assert_eq!(Step::Step4.number(), 4);
    }

    #[test]
    fn test_draft_survives_navigation() {
        let mut wizard = fixture().wizard;
        assert_eq!(wizard.next_step(), Step::Step2);
        wizard.update_draft(|draft| draft.item = "Fries".to_string());

        assert_eq!(wizard.prev_step(), Step::Step1);
        wizard.next_step();
        wizard.next_step();
        assert_eq!(wizard.next_step(), Step::Step4);

        assert_eq!(wizard.draft().item, "Fries");
    }

    #[tokio::test]
    async fn test_invalid_time_range_never_reaches_repository() {
        let mut fixture = fixture();
        fill_valid_draft(&mut fixture.wizard);
        fixture
            .wizard
            .update_draft(|draft| draft.set_day_window(DayOfWeek::Monday, Some((600, 500))));
        go_to_step5(&mut fixture.wizard);

        let result = fixture.wizard.submit().await;

        assert_eq!(result, Err(AddDealError::Validation(ValidationError::InvalidTimeRange)));
        assert_eq!(fixture.deals.add_deal_calls(), 0);
        assert_eq!(fixture.wizard.step(), Step::Step5);
    }

    #[tokio::test]
    async fn test_empty_groups_fail_validation() {
        let mut fixture = fixture();
        fill_valid_draft(&mut fixture.wizard);
        fixture.wizard.update_draft(|draft| draft.applicable_groups.clear());
        go_to_step5(&mut fixture.wizard);

        let result = fixture.wizard.submit().await;

        assert_eq!(
            result,
            Err(AddDealError::Validation(ValidationError::InvalidApplicableGroups))
        );
        assert_eq!(fixture.deals.add_deal_calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_requires_last_step_and_sign_in() {
        let mut fixture = fixture();
        fill_valid_draft(&mut fixture.wizard);

        assert_eq!(fixture.wizard.submit().await, Err(AddDealError::NotAtFinalStep));

        go_to_step5(&mut fixture.wizard);
        fixture.auth.logout();
        assert_eq!(fixture.wizard.submit().await, Err(AddDealError::SignInRequired));
        assert_eq!(fixture.deals.add_deal_calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_submission_posts_deal() {
        let mut fixture = fixture();
        fill_valid_draft(&mut fixture.wizard);
        fixture.wizard.update_draft(|draft| draft.toggle_group(ApplicableGroup::Student));
        go_to_step5(&mut fixture.wizard);
        assert!(fixture.wizard.can_submit());

        let response = fixture.wizard.submit().await.unwrap();

        let restaurant = fixture.deals.get_restaurant("placeId_123").await.unwrap().unwrap();
        let posted = restaurant.raw_deals.iter().find(|d| d.id == response.deal_id).unwrap();
        assert_eq!(posted.item, "Nuggets");
        assert_eq!(posted.user_id, "u1");
        assert_eq!(fixture.wizard.last_submission(), Some(&Ok(response)));
        assert_eq!(fixture.wizard.step(), Step::Step5);
    }

    #[tokio::test]
    async fn test_repository_error_is_surfaced_verbatim() {
        let mut fixture = fixture();
        fill_valid_draft(&mut fixture.wizard);
        go_to_step5(&mut fixture.wizard);
        fixture.deals.set_failing(true);

        let result = fixture.wizard.submit().await;

        assert_eq!(
            result,
            Err(AddDealError::Repository("Deals service unavailable".to_string()))
        );
        assert_eq!(fixture.deals.add_deal_calls(), 1);

        // Step 5 can be re-entered after a failure
        fixture.deals.set_failing(false);
        assert!(fixture.wizard.submit().await.is_ok());
    }

    #[tokio::test]
    async fn test_search_restaurants_skips_repeated_keyword() {
        let mut fixture = fixture();
        let origin = Coordinates::new(1.35, 103.87);

        fixture.wizard.search_restaurants("chef", origin, 5000.0).await.unwrap();
        let results = fixture.wizard.restaurant_results().unwrap().to_vec();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].restaurant_name, "Chef Signature");

        // A failing repository would error if it were called again
        fixture.deals.set_failing(true);
        fixture.wizard.search_restaurants("chef", origin, 5000.0).await.unwrap();
        assert_eq!(fixture.wizard.restaurant_results().unwrap(), results.as_slice());

        assert!(fixture.wizard.search_restaurants("mcd", origin, 5000.0).await.is_err());
        assert_eq!(fixture.wizard.restaurant_results(), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_load_existing_deals_keeps_step() {
        let mut fixture = fixture();
        fixture.wizard.select_restaurant(SelectedRestaurant {
            place_id: "placeId_456".to_string(),
            restaurant_name: "Chef Signature".to_string(),
            ..mcd()
        });
        fixture.wizard.next_step();

        fixture.wizard.load_existing_deals().await.unwrap();

        assert_eq!(fixture.wizard.existing_deals().len(), 2);
        assert_eq!(fixture.wizard.step(), Step::Step2);

        fixture.wizard.select_restaurant(SelectedRestaurant {
            place_id: "placeId_unknown".to_string(),
            ..mcd()
        });
        assert!(fixture.wizard.existing_deals().is_empty());
        fixture.wizard.load_existing_deals().await.unwrap();
        assert!(fixture.wizard.existing_deals().is_empty());
    }

    #[tokio::test]
    async fn test_attach_and_remove_image() {
        let mut fixture = fixture();
        fill_valid_draft(&mut fixture.wizard);

        let url = fixture.wizard.attach_image(Path::new("/tmp/photo.jpg")).await.unwrap();

        let key = fixture.wizard.draft().image_key.clone().unwrap();
        assert!(key.starts_with("deal_u1_"));
        assert!(url.ends_with(&key));
        assert_eq!(fixture.images.uploads().len(), 1);

        go_to_step5(&mut fixture.wizard);
        fixture.wizard.remove_image();
        let response = fixture.wizard.submit().await.unwrap();
        let restaurant = fixture.deals.get_restaurant("placeId_123").await.unwrap().unwrap();
        let posted = restaurant.raw_deals.iter().find(|d| d.id == response.deal_id).unwrap();
        assert_eq!(posted.image_id, None);
    }

    #[tokio::test]
    async fn test_configured_image_prefix() {
        let fixture = fixture();
        let config = ClientConfig {
            image_key_prefix: "promo".to_string(),
            ..ClientConfig::default()
        };
        let mut wizard = fixture.wizard.configured(&config);

        wizard.attach_image(Path::new("/tmp/photo.jpg")).await.unwrap();

        assert!(wizard.draft().image_key.as_deref().unwrap().starts_with("promo_u1_"));
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_draft_unchanged() {
        let mut fixture = fixture();
        fixture.images.set_failing(true);

        let result = fixture.wizard.attach_image(Path::new("/tmp/photo.jpg")).await;

        assert_eq!(result, Err(AddDealError::Repository("Image upload failed".to_string())));
        assert_eq!(fixture.wizard.draft().image_key, None);
        assert_eq!(fixture.wizard.draft().image_path, None);
    }
}
