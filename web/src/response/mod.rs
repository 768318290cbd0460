pub(crate) mod home_page;
