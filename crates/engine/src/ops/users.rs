use uuid::Uuid;

use crate::{Registration, ResultEngine, util::parse_uuid};

use super::{Engine, balances::store_error};

impl Engine {
    /// Register `user_id` with a zero balance and return the parsed identity.
    ///
    /// Registering an identity twice is not an error: the second call reports
    /// `Registration::AlreadyRegistered` and the balance is untouched.
    pub async fn insert_user(&self, user_id: &str) -> ResultEngine<(Uuid, Registration)> {
        let user_id = parse_uuid(user_id, "user")?;
        let registration = self
            .store
            .register_user(user_id)
            .await
            .map_err(|err| store_error(err, user_id))?;
        Ok((user_id, registration))
    }
}
