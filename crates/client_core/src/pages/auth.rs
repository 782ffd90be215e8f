use shared::protocol::{RegisterRequest, User};

use crate::{
    auth::AuthService,
    router::{Navigator, Route},
};

pub struct LoginPage {
    auth: AuthService,
    navigator: Navigator,
    submitting: bool,
    error: Option<String>,
}

impl LoginPage {
    pub fn new(auth: AuthService, navigator: Navigator) -> Self {
        Self {
            auth,
            navigator,
            submitting: false,
            error: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// On success lands on the dashboard.
    pub async fn submit(&mut self, email: &str, password: &str) -> Option<User> {
        self.submitting = true;
        self.error = None;
        let result = self.auth.login(email, password).await;
        self.submitting = false;
        match result {
            Ok(user) => {
                self.navigator.redirect(Route::Dashboard);
                Some(user)
            }
            Err(err) => {
                super::log_failure("login", &err);
                self.error = Some(err.dialog_message("Login failed"));
                None
            }
        }
    }
}

pub struct RegisterPage {
    auth: AuthService,
    navigator: Navigator,
    submitting: bool,
    error: Option<String>,
}

impl RegisterPage {
    pub fn new(auth: AuthService, navigator: Navigator) -> Self {
        Self {
            auth,
            navigator,
            submitting: false,
            error: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self, profile: &RegisterRequest) -> Option<User> {
        self.submitting = true;
        self.error = None;
        let result = self.auth.register(profile).await;
        self.submitting = false;
        match result {
            Ok(user) => {
                self.navigator.redirect(Route::Dashboard);
                Some(user)
            }
            Err(err) => {
                super::log_failure("register", &err);
                self.error = Some(err.first_error_message("Registration failed"));
                None
            }
        }
    }
}

pub struct ProfilePage {
    auth: AuthService,
    navigator: Navigator,
}

impl ProfilePage {
    pub fn new(auth: AuthService, navigator: Navigator) -> Self {
        Self { auth, navigator }
    }

    pub async fn user(&self) -> Option<User> {
        self.auth.current_user().await
    }

    /// Always ends on the login screen, even if the local store misbehaves.
    pub async fn logout(&self) {
        if let Err(err) = self.auth.logout().await {
            super::log_failure("logout", &err);
        }
        self.navigator.redirect(Route::Login);
    }
}
