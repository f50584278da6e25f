mod audio;
mod memory_list;
mod recording_session;
