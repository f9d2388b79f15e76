//! Diesel schema for user persistence.

diesel::table! {
    /// User accounts.
    users (id) {
        /// Internal user identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 150]
        name -> Varchar,
        /// Contact address, unique among active users.
        #[max_length = 255]
        email -> Varchar,
        /// Login handle, unique among active users.
        #[max_length = 100]
        login -> Varchar,
        /// Stored credential secret.
        #[max_length = 255]
        secret -> Varchar,
        /// Access role.
        #[max_length = 20]
        role -> Varchar,
        /// Logical-deletion flag.
        active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
