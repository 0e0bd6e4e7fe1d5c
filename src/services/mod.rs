pub mod mock_twitter;
pub mod twitter;
