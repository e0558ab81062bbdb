//! Binary startup behaviour

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("godot_steam_release").unwrap();
    cmd.env_clear();
    cmd
}

#[test]
fn help_lists_env_file_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--env-file"));
}

#[test]
fn missing_configuration_is_reported_together() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("GODOT_PATH"))
        .stderr(predicate::str::contains("LINUX_DEPOT_ID"));
}

#[test]
fn explicit_env_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["--env-file", "missing.env"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing.env"));
}

#[test]
fn missing_tool_fails_before_prompting() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "GODOT_PATH=/nonexistent/godot\n\
         STEAMCMD_PATH=/nonexistent/steamcmd.sh\n\
         STEAM_USERNAME=builder\n\
         PROJECT_PATH=game\n\
         PROJECT_NAME=Game\n\
         APPID=480\n\
         CONTENT_DEPOT_ID=481\n\
         WINDOWS_DEPOT_ID=482\n\
         MACOS_DEPOT_ID=483\n\
         LINUX_DEPOT_ID=484\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("GODOT_PATH"));
}

#[cfg(unix)]
mod piped {
    use super::cmd;
    use predicates::prelude::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    fn script(path: &Path, body: &str) {
        std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    struct Release {
        dir: tempfile::TempDir,
        upload_log: PathBuf,
    }

    impl Release {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path();
            std::fs::create_dir(root.join("game")).unwrap();
            std::fs::write(
                root.join("game/project.godot"),
                "[application]\nconfig/version=\"1.0\"\n",
            )
            .unwrap();

            // Exporter writes its last argument, the artifact path.
            script(
                &root.join("godot"),
                "for last in \"$@\"; do :; done\necho binary > \"$last\"",
            );
            let upload_log = root.join("steamcmd.log");
            script(
                &root.join("steamcmd"),
                &format!("echo \"$@\" > '{}'", upload_log.display()),
            );

            Self { dir, upload_log }
        }

        fn command(&self) -> assert_cmd::Command {
            let root = self.dir.path();
            let templates = Path::new(env!("CARGO_MANIFEST_DIR")).join("steam_script_templates");
            let mut cmd = cmd();
            cmd.current_dir(root)
                .env("GODOT_PATH", root.join("godot"))
                .env("STEAMCMD_PATH", root.join("steamcmd"))
                .env("STEAM_USERNAME", "builder")
                .env("PROJECT_PATH", root.join("game"))
                .env("PROJECT_NAME", "Game")
                .env("APPID", "480")
                .env("CONTENT_DEPOT_ID", "481")
                .env("WINDOWS_DEPOT_ID", "482")
                .env("MACOS_DEPOT_ID", "483")
                .env("LINUX_DEPOT_ID", "484")
                .env("BUILD_ROOT", "build")
                .env("STEAM_TEMPLATE_DIR", templates);
            cmd
        }

        fn descriptor(&self) -> String {
            std::fs::read_to_string(self.dir.path().join("game/project.godot")).unwrap()
        }
    }

    #[test]
    fn answers_can_be_piped() {
        let release = Release::new();

        release.command().write_stdin("1.1\nn\n").assert().success();

        assert!(release.descriptor().contains("config/version=\"1.1\""));
        assert!(release.dir.path().join("build/Game_1.1_linux.zip").is_file());
        let upload = std::fs::read_to_string(&release.upload_log).unwrap();
        assert!(upload.starts_with("+login builder +run_app_build"));
        assert!(upload.contains("upload_content.vdf"));
        assert!(upload.contains("upload_win.vdf"));
        assert!(upload.contains("upload_linux.vdf"));
        assert!(!upload.contains("upload_macos.vdf"));
    }

    #[test]
    fn closed_stdin_fails_before_version_bump() {
        let release = Release::new();

        release
            .command()
            .write_stdin("")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("New version (current 1.0)"));

        assert!(release.descriptor().contains("config/version=\"1.0\""));
        assert!(!release.upload_log.exists());
    }
}
