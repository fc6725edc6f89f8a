pub mod recognition_error;
pub mod segment;
pub mod speech_recognizer;
