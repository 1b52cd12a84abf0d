pub mod cv_request;
