use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;
use crate::detector::Confidence;

static DATA_DIR: LazyLock<DataDir> = LazyLock::new(|| {
    let proj_dirs =
        ProjectDirs::from("", "vestwatch", "vestwatch").expect("failed to get project dir");
    DataDir { path: proj_dirs.data_dir().to_path_buf() }
});

fn default_data_dir() -> &'static str {
    DATA_DIR.path().to_str().unwrap()
}

#[derive(Parser, Debug, Clone)]
pub struct DetectOptions {
    /// 模型置信度阈值，范围 0.25 到 1.0
    #[arg(long, value_name = "CONF", default_value_t = Confidence::default())]
    pub confidence: Confidence,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "vestwatch", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// 数据目录
    #[arg(long, default_value = default_data_dir())]
    pub data_dir: DataDir,
    /// 数据库连接字符串，默认为数据目录下的 history.db
    #[arg(short, long, value_name = "URL")]
    pub database: Option<String>,
}

impl Opts {
    /// 返回数据库连接字符串，使用默认路径时会创建数据目录
    pub fn database_url(&self) -> std::io::Result<String> {
        match &self.database {
            Some(url) => Ok(url.clone()),
            None => {
                std::fs::create_dir_all(self.data_dir.path())?;
                Ok(format!("sqlite://{}", self.data_dir.database().display()))
            }
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 启动 HTTP 服务
    Server(ServerCommand),
    /// 列出检测历史
    List(ListCommand),
    /// 删除一条检测历史
    Delete(DeleteCommand),
    /// 导出一条检测历史中的标注图片
    Export(ExportCommand),
    /// 检测一张图片并写入历史
    Detect(DetectCommand),
    /// 逐帧标注目录中的视频帧，不写入历史
    Annotate(AnnotateCommand),
}

#[derive(Debug, Clone)]
pub struct DataDir {
    path: PathBuf,
}

impl DataDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回数据库文件的路径
    pub fn database(&self) -> PathBuf {
        self.path.join("history.db")
    }
}

impl FromStr for DataDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[test]
    fn database_url_defaults_to_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let data_dir = dir.path().join("nested");
        let opts = Opts::parse_from([
            "vestwatch",
            "--data-dir",
            data_dir.to_str().unwrap(),
            "list",
        ]);
        let url = opts.database_url().unwrap();
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("history.db"));
        assert!(data_dir.is_dir());
    }

    #[test]
    fn explicit_database_wins() {
        let opts = Opts::parse_from(["vestwatch", "-d", "sqlite::memory:", "delete", "3"]);
        assert_eq!(opts.database_url().unwrap(), "sqlite::memory:");
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let result =
            Opts::try_parse_from(["vestwatch", "detect", "worker.jpg", "--confidence", "0.1"]);
        assert!(result.is_err());
    }

    #[test]
    fn list_output_format() {
        assert!(Opts::try_parse_from(["vestwatch", "list", "--output-format", "json"]).is_ok());
        assert!(Opts::try_parse_from(["vestwatch", "list", "--output-format", "table"]).is_ok());
        assert!(Opts::try_parse_from(["vestwatch", "list", "--output-format", "xml"]).is_err());
    }
}
