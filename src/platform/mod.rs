// Platform integrations

pub mod pose;
