pub mod audio_equipment;
pub mod catering;
pub mod clients;
pub mod contract_sequences;
pub mod contract_song_requests;
pub mod contracts;
pub mod song_requests;
