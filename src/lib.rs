//! Crop Scheme Eligibility API Library
//!
//! Serves a farmer intake form and reports eligibility for the PMFBY,
//! PM-KISAN and FPO support schemes using pre-trained binary classifiers.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Encoding and prediction logic.
//! - `artifact_validator`: SHA-256 integrity check for model artifacts.
//! - `classifier`: Classifier trait and JSON model artifacts.
//! - `config`: Configuration management.
//! - `dataset`: Reference dataset and dropdown options.
//! - `encoder`: Raw record to feature vector encoding.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `label_encoders`: Categorical label encoders.
//! - `models`: Core data models.
//! - `predictor`: Model registry and thresholds.
//! - `router`: Route table and middleware.
//! - `services`: Encode-and-predict pipeline.
//! - `templates`: HTML templates.

pub mod api;
pub mod core;

pub mod artifact_validator;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod errors;
pub mod handlers;
pub mod label_encoders;
pub mod models;
pub mod predictor;
pub mod router;
pub mod services;
pub mod templates;
