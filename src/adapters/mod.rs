//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                |
//! |----------------|--------------------|----------------------------|
//! | `serial`       | Transport          | USB-serial reader          |
//! | `csv_log`      | EventSink          | Dated CSV files            |
//! | `publish`      | EventSink          | PublishPort (NDJSON)       |
//! |                | PublishPort        | Any `io::Write`            |
//! | `log_sink`     | EventSink          | `log` facade               |
//! | `time`         | ClockPort          | System wall clock          |
//! | `config_file`  | ConfigPort         | JSON file                  |

pub mod config_file;
pub mod csv_log;
pub mod log_sink;
pub mod publish;
pub mod serial;
pub mod time;
