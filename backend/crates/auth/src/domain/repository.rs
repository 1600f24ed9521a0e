//! Repository Extensions
//!
//! Account and role lookups layered on the generic repository.

use platform::repository::{BaseRepository, Filter, Session, StoreResult};

use crate::domain::entity::{Role, User};

pub type UserRepository = BaseRepository<User>;
pub type RoleRepository = BaseRepository<Role>;

pub const USERS: UserRepository = BaseRepository::new();
pub const ROLES: RoleRepository = BaseRepository::new();

/// User lookups
#[trait_variant::make(UserLookup: Send)]
pub trait LocalUserLookup {
    /// Find a live user by exact account name
    async fn find_by_account<S: Session>(
        &self,
        session: &mut S,
        account: &str,
    ) -> StoreResult<Option<User>>;

    /// Number of distinct live users among `ids`
    async fn count_existing<S: Session>(&self, session: &mut S, ids: &[i64]) -> StoreResult<i64>;
}

/// Role lookups
#[trait_variant::make(RoleLookup: Send)]
pub trait LocalRoleLookup {
    async fn find_by_name<S: Session>(&self, session: &mut S, name: &str)
    -> StoreResult<Option<Role>>;
}

impl UserLookup for UserRepository {
    async fn find_by_account<S: Session>(
        &self,
        session: &mut S,
        account: &str,
    ) -> StoreResult<Option<User>> {
        let filter = Filter::new().eq("account", account);
        Ok(session.fetch_all::<User>(&filter).await?.into_iter().next())
    }

    async fn count_existing<S: Session>(&self, session: &mut S, ids: &[i64]) -> StoreResult<i64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let filter = Filter::new().any_of("id", ids.to_vec());
        session.count::<User>(&filter).await
    }
}

impl RoleLookup for RoleRepository {
    async fn find_by_name<S: Session>(
        &self,
        session: &mut S,
        name: &str,
    ) -> StoreResult<Option<Role>> {
        let filter = Filter::new().eq("name", name);
        Ok(session.fetch_all::<Role>(&filter).await?.into_iter().next())
    }
}
