
mod boundary;
mod config_boot;
mod control_mode;
mod end_to_end;
mod idempotence;
mod monitor;
mod setpoint;
