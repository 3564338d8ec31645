//! Runs the built `vecadd` binary end to end.

use std::process::{Command, Output};
use vecadd_common::ENV_OVERRIDES;
use vecadd_kernels::device_features::GPU_FAKE_ENV;

fn command(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vecadd"));
    for key in ENV_OVERRIDES.iter().chain([&GPU_FAKE_ENV, &"RUST_LOG"]) {
        cmd.env_remove(key);
    }
    cmd.args(args);
    cmd
}

fn vecadd(args: &[&str]) -> Output {
    command(args).output().expect("failed to spawn vecadd")
}

#[test]
fn run_on_host_device_exits_zero_with_json() {
    let out = vecadd(&["--device", "host", "--format", "json", "run", "--elements", "1000"]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["all_verified"], true);
    assert_eq!(json["float"]["elements"], 1000);
    assert_eq!(json["float"]["runs"].as_array().unwrap().len(), 3);
}

#[test]
fn disabled_accelerator_exits_two() {
    let out = vecadd(&["--device", "none", "run", "-n", "64"]);
    assert_eq!(out.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("failed to execute"), "{stdout}");
}

#[test]
fn bad_config_exits_one() {
    let out = vecadd(&["--work-group-size", "3", "run", "-n", "8"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn devices_lists_kernels() {
    let out = vecadd(&["--device", "host", "--format", "json", "devices"]);
    assert_eq!(out.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["accelerator"], "host-parallel");
    assert_eq!(json["available_kernels"][0], "scalar");
}

#[test]
fn environment_overrides_reach_the_run() {
    let out = command(&["--format", "json", "run", "-n", "32"])
        .env("VECADD_DEVICE", "host")
        .env("VECADD_WORK_GROUP_SIZE", "3")
        .output()
        .expect("failed to spawn vecadd");

    // 3 is not a power of two, so the loaded configuration is rejected
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("work_group_size must be a power of two"));
}
