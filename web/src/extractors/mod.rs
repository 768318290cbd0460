pub(crate) mod user_session;
