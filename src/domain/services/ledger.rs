use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use crate::domain::{
    models::{
        booking::{
            Booking, BookingStatus, NewBookingParams, OwnerBookingView, TenantBookingView, TenantContact,
        },
        property::{Property, PropertySummary, SharingType},
        user::User,
    },
    ports::{BookingRepository, PropertyRepository, UserRepository},
    services::pricing,
};
use crate::error::AppError;

/// Everything the tenant submits when booking. Financial figures are stored
/// verbatim unless total verification is enabled.
#[derive(Debug, Clone)]
pub struct BookingInput {
    pub property_id: String,
    pub sharing_type: SharingType,
    pub move_in_date: String,
    pub duration: i32,
    pub monthly_rent: i64,
    pub security_deposit: i64,
    pub discount: i64,
    pub total_amount: i64,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
}

pub struct BookingLedger {
    bookings: Arc<dyn BookingRepository>,
    properties: Arc<dyn PropertyRepository>,
    users: Arc<dyn UserRepository>,
    verify_totals: bool,
}

fn distinct(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}

impl BookingLedger {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        properties: Arc<dyn PropertyRepository>,
        users: Arc<dyn UserRepository>,
        verify_totals: bool,
    ) -> Self {
        Self { bookings, properties, users, verify_totals }
    }

    pub async fn create(&self, tenant: &User, input: BookingInput) -> Result<Booking, AppError> {
        let property = self.properties.find_by_id(&input.property_id).await?
            .ok_or(AppError::NotFound("Property not found".into()))?;

        if self.verify_totals {
            verify_against_listing(&property, &input)?;
        }

        let booking = Booking::new(NewBookingParams {
            user_id: tenant.id.clone(),
            property_id: property.id,
            sharing_type: input.sharing_type,
            move_in_date: input.move_in_date,
            duration: input.duration,
            monthly_rent: input.monthly_rent,
            security_deposit: input.security_deposit,
            discount: input.discount,
            total_amount: input.total_amount,
            user_name: input.user_name,
            user_email: input.user_email,
            user_phone: input.user_phone,
        });

        let created = self.bookings.create(&booking).await?;
        info!("Booking created: {} by {} on property {}", created.id, tenant.id, created.property_id);
        Ok(created)
    }

    pub async fn list_for_tenant(&self, tenant: &User) -> Result<Vec<TenantBookingView>, AppError> {
        let bookings = self.bookings.list_by_user(&tenant.id).await?;
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let ids = distinct(bookings.iter().map(|b| b.property_id.clone()));
        let summaries: HashMap<String, PropertySummary> = self.properties.find_many(&ids).await?
            .iter()
            .map(|p| (p.id.clone(), PropertySummary::from(p)))
            .collect();

        Ok(bookings
            .into_iter()
            .map(|booking| {
                let property = summaries.get(&booking.property_id).cloned().unwrap_or_default();
                TenantBookingView { booking, property }
            })
            .collect())
    }

    /// Two-step read: resolve the caller's listings, then the bookings that
    /// reference them. Not transactional.
    pub async fn list_for_owner(&self, owner: &User) -> Result<Vec<OwnerBookingView>, AppError> {
        let owned = self.properties.list_by_owner(&owner.id).await?;
        if owned.is_empty() {
            return Ok(Vec::new());
        }

        let summaries: HashMap<String, PropertySummary> = owned
            .iter()
            .map(|p| (p.id.clone(), PropertySummary::from(p)))
            .collect();
        let property_ids: Vec<String> = owned.into_iter().map(|p| p.id).collect();

        let bookings = self.bookings.list_by_properties(&property_ids).await?;
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let tenant_ids = distinct(bookings.iter().map(|b| b.user_id.clone()));
        let tenants: HashMap<String, User> = self.users.find_many(&tenant_ids).await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(bookings
            .into_iter()
            .map(|booking| {
                let property = summaries.get(&booking.property_id).cloned().unwrap_or_default();
                let tenant = match tenants.get(&booking.user_id) {
                    Some(u) => TenantContact {
                        name: u.name.clone(),
                        email: u.email.clone(),
                        phone: u.phone.clone().unwrap_or_default(),
                    },
                    None => TenantContact {
                        name: booking.user_name.clone(),
                        email: booking.user_email.clone(),
                        phone: booking.user_phone.clone(),
                    },
                };
                OwnerBookingView { booking, property, tenant }
            })
            .collect())
    }

    /// load booking → not-found → ownership through the listing → transition → write.
    /// A listing that no longer exists cannot prove ownership and is treated as forbidden.
    pub async fn update_status(&self, owner: &User, booking_id: &str, next: BookingStatus) -> Result<Booking, AppError> {
        let booking = self.bookings.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        let owns_listing = self.properties.find_by_id(&booking.property_id).await?
            .is_some_and(|p| p.owner_id == owner.id);
        if !owns_listing {
            warn!("Identity {} may not update booking {}", owner.id, booking.id);
            return Err(AppError::Forbidden("Not authorized to update this booking".into()));
        }

        if !booking.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Booking is {} and cannot be marked {}",
                booking.status, next
            )));
        }

        let updated = self.bookings.update_status(&booking.id, booking.status, next).await?
            .ok_or_else(|| AppError::Conflict("Booking status was changed by another request".into()))?;

        info!("Booking {} status {} -> {}", updated.id, booking.status, updated.status);
        Ok(updated)
    }
}

fn verify_against_listing(property: &Property, input: &BookingInput) -> Result<(), AppError> {
    let tier = property.tier(input.sharing_type).ok_or_else(|| {
        AppError::Validation(format!("{} sharing is not offered by this property", input.sharing_type))
    })?;
    if !tier.available {
        return Err(AppError::Validation(format!("{} sharing is currently unavailable", input.sharing_type)));
    }
    if tier.price != input.monthly_rent {
        return Err(AppError::Validation(format!(
            "monthly_rent {} does not match the listed price {}",
            input.monthly_rent, tier.price
        )));
    }
    let expected = pricing::total_amount(input.monthly_rent, input.duration, input.security_deposit, input.discount);
    if expected != input.total_amount {
        return Err(AppError::Validation(format!(
            "total_amount {} does not match the computed total {}",
            input.total_amount, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        booking::DEFAULT_SECURITY_DEPOSIT,
        property::{Gender, NewPropertyParams, SharingTier},
        user::Role,
    };
    use crate::domain::ports::{MockBookingRepository, MockPropertyRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn user(role: Role, name: &str) -> User {
        User::new(name.into(), format!("{name}@x.com"), "h".into(), role, Some("900".into()))
    }

    fn listing(owner: &User) -> Property {
        Property::new(NewPropertyParams {
            owner_id: owner.id.clone(),
            name: "Lakeview PG".into(),
            city: "Hyderabad".into(),
            locality: "Madhapur".into(),
            address: "Road 36".into(),
            gender: Gender::Boys,
            description: "AC rooms".into(),
            images: vec!["/uploads/x.jpg".into()],
            sharing_types: vec![
                SharingTier { sharing_type: SharingType::Single, price: 12000, available: true },
                SharingTier { sharing_type: SharingType::Double, price: 8000, available: false },
            ],
            amenities: vec![],
        })
    }

    fn input(property_id: &str, total_amount: i64) -> BookingInput {
        BookingInput {
            property_id: property_id.into(),
            sharing_type: SharingType::Single,
            move_in_date: "2026-12-01".into(),
            duration: 3,
            monthly_rent: 12000,
            security_deposit: DEFAULT_SECURITY_DEPOSIT,
            discount: 0,
            total_amount,
            user_name: "Tara".into(),
            user_email: "tara@x.com".into(),
            user_phone: "900".into(),
        }
    }

    fn ledger(
        bookings: MockBookingRepository,
        properties: MockPropertyRepository,
        users: MockUserRepository,
        verify_totals: bool,
    ) -> BookingLedger {
        BookingLedger::new(Arc::new(bookings), Arc::new(properties), Arc::new(users), verify_totals)
    }

    fn booking_for(tenant: &User, property: &Property, status: BookingStatus) -> Booking {
        let mut b = Booking::new(NewBookingParams {
            user_id: tenant.id.clone(),
            property_id: property.id.clone(),
            sharing_type: SharingType::Single,
            move_in_date: "2026-12-01".into(),
            duration: 1,
            monthly_rent: 12000,
            security_deposit: 10000,
            discount: 0,
            total_amount: 22000,
            user_name: tenant.name.clone(),
            user_email: tenant.email.clone(),
            user_phone: "900".into(),
        });
        b.status = status;
        b
    }

    #[tokio::test]
    async fn test_create_requires_existing_property() {
        let mut properties = MockPropertyRepository::new();
        properties.expect_find_by_id().returning(|_| Ok(None));
        let mut bookings = MockBookingRepository::new();
        bookings.expect_create().never();

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let tenant = user(Role::User, "tara");
        let err = ledger.create(&tenant, input("missing", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_stores_submitted_figures_verbatim() {
        let owner = user(Role::Owner, "olga");
        let property = listing(&owner);
        let pid = property.id.clone();

        let mut properties = MockPropertyRepository::new();
        properties.expect_find_by_id().returning(move |_| Ok(Some(property.clone())));
        let mut bookings = MockBookingRepository::new();
        bookings.expect_create().returning(|b| Ok(b.clone()));

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let tenant = user(Role::User, "tara");
        // Inconsistent total survives in pass-through mode.
        let created = ledger.create(&tenant, input(&pid, 1)).await.unwrap();
        assert_eq!(created.total_amount, 1);
        assert_eq!(created.status, BookingStatus::Active);
        assert_eq!(created.user_id, tenant.id);
    }

    #[tokio::test]
    async fn test_create_with_verification_rejects_mismatched_totals() {
        let owner = user(Role::Owner, "olga");
        let property = listing(&owner);
        let pid = property.id.clone();

        let mut properties = MockPropertyRepository::new();
        properties.expect_find_by_id().returning(move |_| Ok(Some(property.clone())));
        let mut bookings = MockBookingRepository::new();
        bookings.expect_create().times(1).returning(|b| Ok(b.clone()));

        let ledger = ledger(bookings, properties, MockUserRepository::new(), true);
        let tenant = user(Role::User, "tara");

        assert!(matches!(ledger.create(&tenant, input(&pid, 1)).await, Err(AppError::Validation(_))));

        let mut unavailable = input(&pid, 34000);
        unavailable.sharing_type = SharingType::Double;
        unavailable.monthly_rent = 8000;
        assert!(matches!(ledger.create(&tenant, unavailable).await, Err(AppError::Validation(_))));

        let ok = ledger.create(&tenant, input(&pid, 3 * 12000 + 10000)).await.unwrap();
        assert_eq!(ok.total_amount, 46000);
    }

    #[tokio::test]
    async fn test_update_status_by_non_owner_is_forbidden() {
        let owner = user(Role::Owner, "olga");
        let intruder = user(Role::Owner, "ivan");
        let tenant = user(Role::User, "tara");
        let property = listing(&owner);
        let booking = booking_for(&tenant, &property, BookingStatus::Active);
        let bid = booking.id.clone();

        let mut bookings = MockBookingRepository::new();
        bookings.expect_find_by_id().with(eq(bid.clone())).returning(move |_| Ok(Some(booking.clone())));
        bookings.expect_update_status().never();
        let mut properties = MockPropertyRepository::new();
        properties.expect_find_by_id().returning(move |_| Ok(Some(property.clone())));

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let err = ledger.update_status(&intruder, &bid, BookingStatus::Completed).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_status_on_deleted_property_is_forbidden() {
        let owner = user(Role::Owner, "olga");
        let tenant = user(Role::User, "tara");
        let property = listing(&owner);
        let booking = booking_for(&tenant, &property, BookingStatus::Active);
        let bid = booking.id.clone();

        let mut bookings = MockBookingRepository::new();
        bookings.expect_find_by_id().returning(move |_| Ok(Some(booking.clone())));
        bookings.expect_update_status().never();
        let mut properties = MockPropertyRepository::new();
        properties.expect_find_by_id().returning(|_| Ok(None));

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let err = ledger.update_status(&owner, &bid, BookingStatus::Cancelled).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_status_missing_booking_is_not_found() {
        let mut bookings = MockBookingRepository::new();
        bookings.expect_find_by_id().returning(|_| Ok(None));
        let mut properties = MockPropertyRepository::new();
        properties.expect_find_by_id().never();

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let owner = user(Role::Owner, "olga");
        let err = ledger.update_status(&owner, "nope", BookingStatus::Completed).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_status_respects_terminal_states() {
        let owner = user(Role::Owner, "olga");
        let tenant = user(Role::User, "tara");
        let property = listing(&owner);
        let booking = booking_for(&tenant, &property, BookingStatus::Completed);
        let bid = booking.id.clone();

        let mut bookings = MockBookingRepository::new();
        bookings.expect_find_by_id().returning(move |_| Ok(Some(booking.clone())));
        bookings.expect_update_status().never();
        let mut properties = MockPropertyRepository::new();
        properties.expect_find_by_id().returning(move |_| Ok(Some(property.clone())));

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let err = ledger.update_status(&owner, &bid, BookingStatus::Active).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_status_by_owner_writes_with_expected_status() {
        let owner = user(Role::Owner, "olga");
        let tenant = user(Role::User, "tara");
        let property = listing(&owner);
        let booking = booking_for(&tenant, &property, BookingStatus::Active);
        let bid = booking.id.clone();
        let stored = booking.clone();

        let mut bookings = MockBookingRepository::new();
        bookings.expect_find_by_id().returning(move |_| Ok(Some(booking.clone())));
        bookings
            .expect_update_status()
            .with(eq(bid.clone()), eq(BookingStatus::Active), eq(BookingStatus::Completed))
            .times(1)
            .returning(move |_, _, next| {
                let mut b = stored.clone();
                b.status = next;
                Ok(Some(b))
            });
        let mut properties = MockPropertyRepository::new();
        properties.expect_find_by_id().returning(move |_| Ok(Some(property.clone())));

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let updated = ledger.update_status(&owner, &bid, BookingStatus::Completed).await.unwrap();
        assert_eq!(updated.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_status_lost_race_is_conflict() {
        let owner = user(Role::Owner, "olga");
        let tenant = user(Role::User, "tara");
        let property = listing(&owner);
        let booking = booking_for(&tenant, &property, BookingStatus::Active);
        let bid = booking.id.clone();

        let mut bookings = MockBookingRepository::new();
        bookings.expect_find_by_id().returning(move |_| Ok(Some(booking.clone())));
        bookings.expect_update_status().returning(|_, _, _| Ok(None));
        let mut properties = MockPropertyRepository::new();
        properties.expect_find_by_id().returning(move |_| Ok(Some(property.clone())));

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let err = ledger.update_status(&owner, &bid, BookingStatus::Cancelled).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_owner_with_no_properties_gets_empty_list() {
        let mut properties = MockPropertyRepository::new();
        properties.expect_list_by_owner().returning(|_| Ok(vec![]));
        let mut bookings = MockBookingRepository::new();
        bookings.expect_list_by_properties().never();

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let owner = user(Role::Owner, "olga");
        assert!(ledger.list_for_owner(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owner_list_joins_live_tenant_contact() {
        let owner = user(Role::Owner, "olga");
        let tenant = user(Role::User, "tara");
        let property = listing(&owner);
        let booking = booking_for(&tenant, &property, BookingStatus::Active);
        let owned = vec![property.clone()];
        let mut renamed = tenant.clone();
        renamed.name = "Tara K".into();

        let mut properties = MockPropertyRepository::new();
        properties.expect_list_by_owner().returning(move |_| Ok(owned.clone()));
        let mut bookings = MockBookingRepository::new();
        bookings.expect_list_by_properties().returning(move |_| Ok(vec![booking.clone()]));
        let mut users = MockUserRepository::new();
        users.expect_find_many().returning(move |_| Ok(vec![renamed.clone()]));

        let ledger = ledger(bookings, properties, users, false);
        let rows = ledger.list_for_owner(&owner).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tenant.name, "Tara K");
        assert_eq!(rows[0].tenant.phone, "900");
        assert_eq!(rows[0].property.name, "Lakeview PG");
        assert_eq!(rows[0].booking.user_name, "tara");
    }

    #[tokio::test]
    async fn test_tenant_list_tolerates_deleted_property() {
        let owner = user(Role::Owner, "olga");
        let tenant = user(Role::User, "tara");
        let property = listing(&owner);
        let booking = booking_for(&tenant, &property, BookingStatus::Active);

        let mut bookings = MockBookingRepository::new();
        bookings.expect_list_by_user().returning(move |_| Ok(vec![booking.clone()]));
        let mut properties = MockPropertyRepository::new();
        properties.expect_find_many().returning(|_| Ok(vec![]));

        let ledger = ledger(bookings, properties, MockUserRepository::new(), false);
        let rows = ledger.list_for_tenant(&tenant).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].property, PropertySummary::default());
    }
}
