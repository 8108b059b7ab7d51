//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. They are used by
//! Diesel for compile-time query validation and type-safe SQL generation.
//! `diesel print-schema` against a migrated database regenerates them.

diesel::table! {
    /// Registered identities. `username` and `email` carry unique
    /// constraints named `users_username_key` and `users_email_key`.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        full_name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contact profile created with every identity, plus the pending reset
    /// token digest.
    identity_profiles (user_id) {
        user_id -> Uuid,
        title -> Varchar,
        bio -> Text,
        location -> Varchar,
        website -> Text,
        phone -> Varchar,
        reset_token_digest -> Nullable<Varchar>,
        reset_token_expires_at -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issued refresh tokens; `revoked_at` marks a blacklisted token.
    refresh_tokens (jti) {
        jti -> Uuid,
        user_id -> Uuid,
        issued_at -> Timestamptz,
        expires_at -> Timestamptz,
        revoked_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// One portfolio profile per identity.
    portfolio_profiles (id) {
        id -> Uuid,
        user_id -> Uuid,
        avatar -> Text,
        title -> Varchar,
        bio -> Text,
        location -> Varchar,
        phone -> Varchar,
        website -> Text,
        github -> Text,
        linkedin -> Text,
        twitter -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    skills (id) {
        id -> Uuid,
        profile_id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    projects (id) {
        id -> Uuid,
        profile_id -> Uuid,
        title -> Varchar,
        description -> Text,
        image -> Nullable<Text>,
        live_url -> Nullable<Text>,
        source_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Technologies of a project; `position` preserves submission order.
    project_technologies (id) {
        id -> Uuid,
        project_id -> Uuid,
        position -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    experiences (id) {
        id -> Uuid,
        profile_id -> Uuid,
        company -> Varchar,
        position -> Varchar,
        description -> Text,
        start_date -> Date,
        end_date -> Nullable<Date>,
        is_current -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    education (id) {
        id -> Uuid,
        profile_id -> Uuid,
        institution -> Varchar,
        degree -> Varchar,
        field_of_study -> Varchar,
        description -> Text,
        start_date -> Date,
        end_date -> Nullable<Date>,
        is_current -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(identity_profiles -> users (user_id));
diesel::joinable!(refresh_tokens -> users (user_id));
diesel::joinable!(portfolio_profiles -> users (user_id));
diesel::joinable!(skills -> portfolio_profiles (profile_id));
diesel::joinable!(projects -> portfolio_profiles (profile_id));
diesel::joinable!(project_technologies -> projects (project_id));
diesel::joinable!(experiences -> portfolio_profiles (profile_id));
diesel::joinable!(education -> portfolio_profiles (profile_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    identity_profiles,
    refresh_tokens,
    portfolio_profiles,
    skills,
    projects,
    project_technologies,
    experiences,
    education,
);
