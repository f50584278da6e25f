mod audd_client;
mod image_fetcher;
mod interpreter;
mod outcome;

pub use {
    audd_client::{AuddClient, DEFAULT_ENDPOINT, normalize_audd_response},
    image_fetcher::HttpImageFetcher,
    interpreter::{interpret, interpret_call},
    outcome::{MALFORMED_MESSAGE, NO_MATCH_MESSAGE, RecognitionOutcome, UNREACHABLE_MESSAGE},
};
