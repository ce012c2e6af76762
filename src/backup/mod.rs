pub mod archive;
pub mod archiver;
pub mod compress;
pub mod config;
pub mod file_ext;
pub mod outcome;
pub mod pattern;
pub mod report;
pub mod result_error;
pub mod run;
pub mod tar;
pub mod target;
pub mod validate;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
