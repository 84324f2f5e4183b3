// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod forms;
pub mod session;

pub use forms::{FieldErrors, FormState, SignInForm, SignUpForm};
pub use session::{
    AccessUpdate, ActionStatus, AccessView, Credential, Session, SessionToken,
    SessionUpdate,
};
