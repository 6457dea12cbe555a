use chrono::Utc;
use rivalwatch_common::types::{NewUser, User};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::entities::user::{self, Column, Entity};
use crate::error::{Result, StorageError};
use crate::store::IntelStore;

fn to_user(m: user::Model) -> User {
    User {
        id: m.id,
        email: m.email,
        first_name: m.first_name,
        last_name: m.last_name,
        role: m.role,
        company_id: m.company_id,
        is_active: m.is_active,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl IntelStore {
    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(to_user))
    }

    /// Email lookup is case-insensitive; addresses are stored lowercased.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let model = Entity::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db())
            .await?;
        Ok(model.map(to_user))
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let email = new_user.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(StorageError::Invalid {
                entity: "user",
                reason: "email must not be empty".to_string(),
            });
        }
        if self.get_user_by_email(&email).await?.is_some() {
            return Err(StorageError::Invalid {
                entity: "user",
                reason: format!("email '{email}' already exists"),
            });
        }

        let now = Utc::now().fixed_offset();
        let am = user::ActiveModel {
            id: Set(rivalwatch_common::id::next_id()),
            email: Set(email),
            first_name: Set(new_user.first_name.trim().to_owned()),
            last_name: Set(new_user.last_name.trim().to_owned()),
            role: Set(new_user.role.filter(|r| !r.trim().is_empty())),
            company_id: Set(new_user.company_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(to_user(am.insert(self.db()).await?))
    }

    pub async fn set_user_active(&self, id: &str, active: bool) -> Result<bool> {
        let Some(model) = Entity::find_by_id(id).one(self.db()).await? else {
            return Ok(false);
        };
        let mut am: user::ActiveModel = model.into();
        am.is_active = Set(active);
        am.updated_at = Set(Utc::now().fixed_offset());
        am.update(self.db()).await?;
        Ok(true)
    }

    pub async fn count_company_users(&self, company_id: &str) -> Result<u64> {
        let count = Entity::find()
            .filter(Column::CompanyId.eq(company_id))
            .count(self.db())
            .await?;
        Ok(count)
    }

    /// Active team members of a company, sorted by last then first name.
    pub async fn list_company_users(&self, company_id: &str) -> Result<Vec<User>> {
        let models = Entity::find()
            .filter(Column::CompanyId.eq(company_id))
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName)
            .all(self.db())
            .await?;
        Ok(models.into_iter().map(to_user).collect())
    }
}
