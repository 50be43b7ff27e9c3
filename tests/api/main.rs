mod helpers;
mod stats;
mod submissions;
