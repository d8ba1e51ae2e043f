use std::io::Write;

use tracing::{error, info, span, Level};

use gcstore::{
    Acl, BlobStorage, FetchOptions, FileInfo, GcsStorage, ListOptions, StorageOptions, StoreFile,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().json().init();

    let span = span!(Level::INFO, "main", context = "main");
    let _e = span.enter();
    info!("called");

    let matches = clap::Command::new("gcstore")
        .arg(clap::Arg::new("PROJECT").required(true).index(1))
        .arg(clap::Arg::new("BUCKET").required(true).index(2))
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("info")
                .about("fetch object metadata")
                .arg(clap::Arg::new("KEY").required(true).index(1))
                .arg(
                    clap::Arg::new("public")
                        .long("public")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            clap::Command::new("get")
                .about("fetch object content to stdout")
                .arg(clap::Arg::new("KEY").required(true).index(1))
                .arg(
                    clap::Arg::new("public")
                        .long("public")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            clap::Command::new("put")
                .about("store a local file under a key")
                .arg(clap::Arg::new("KEY").required(true).index(1))
                .arg(clap::Arg::new("FILE").required(true).index(2))
                .arg(clap::Arg::new("cache-control").long("cache-control"))
                .arg(clap::Arg::new("content-type").long("content-type"))
                .arg(clap::Arg::new("acl").long("acl"))
                .arg(
                    clap::Arg::new("meta")
                        .long("meta")
                        .action(clap::ArgAction::Append)
                        .value_name("NAME=VALUE"),
                ),
        )
        .subcommand(
            clap::Command::new("acl")
                .about("set object visibility")
                .arg(clap::Arg::new("KEY").required(true).index(1))
                .arg(clap::Arg::new("ACL").required(true).index(2)),
        )
        .subcommand(
            clap::Command::new("rm")
                .about("delete one object")
                .arg(clap::Arg::new("KEY").required(true).index(1)),
        )
        .subcommand(
            clap::Command::new("rmdir")
                .about("delete every object under a prefix")
                .arg(clap::Arg::new("DIR").required(true).index(1)),
        )
        .subcommand(
            clap::Command::new("ls")
                .about("list one page of objects")
                .arg(clap::Arg::new("DIR").index(1).default_value(""))
                .arg(
                    clap::Arg::new("deep")
                        .long("deep")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(clap::Arg::new("delimiter").long("delimiter"))
                .arg(
                    clap::Arg::new("max-keys")
                        .long("max-keys")
                        .value_parser(clap::value_parser!(i32)),
                )
                .arg(clap::Arg::new("last-key").long("last-key")),
        )
        .get_matches();

    let project = matches.get_one::<String>("PROJECT").unwrap();
    let bucket = matches.get_one::<String>("BUCKET").unwrap();
    info!(project = project, bucket = bucket, "args");

    let storage = match GcsStorage::new(StorageOptions {
        project: Some(project.clone()),
        bucket: Some(bucket.clone()),
    })
    .await
    {
        Err(err) => fail(&err),
        Ok(storage) => storage,
    };

    match matches.subcommand() {
        Some(("info", sub)) => {
            let key = sub.get_one::<String>("KEY").unwrap();
            let opts = FetchOptions {
                acl: acl_from_flag(sub.get_flag("public")),
            };

            match storage.fetch_info(key, opts).await {
                Err(err) => fail(&err),
                Ok(info) => print_json(&info),
            }
        }
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("KEY").unwrap();
            let opts = FetchOptions {
                acl: acl_from_flag(sub.get_flag("public")),
            };

            match storage.fetch(key, opts).await {
                Err(err) => fail(&err),
                Ok((_, body)) => {
                    std::io::stdout()
                        .write_all(&body)
                        .expect("failed to write to stdout");
                }
            }
        }
        Some(("put", sub)) => {
            let key = sub.get_one::<String>("KEY").unwrap();
            let path = sub.get_one::<String>("FILE").unwrap();

            let buffer = match tokio::fs::read(path).await {
                Err(err) => {
                    error!(error_message = %err, error_group = "read_file");
                    std::process::exit(1);
                }
                Ok(buffer) => buffer,
            };

            let mut headers = FileInfo {
                cache_control: sub.get_one::<String>("cache-control").cloned(),
                content_type: sub.get_one::<String>("content-type").cloned(),
                access_control: sub.get_one::<String>("acl").cloned(),
                ..Default::default()
            };
            for pair in sub.get_many::<String>("meta").unwrap_or_default() {
                if let Some((name, value)) = pair.split_once('=') {
                    headers
                        .custom_headers
                        .insert(name.to_string(), value.to_string());
                }
            }

            match storage.store(key, StoreFile { buffer, headers }).await {
                Err(err) => fail(&err),
                Ok(info) => print_json(&info),
            }
        }
        Some(("acl", sub)) => {
            let key = sub.get_one::<String>("KEY").unwrap();
            let acl = sub.get_one::<String>("ACL").unwrap();

            if let Err(err) = storage.set_acl(key, acl).await {
                fail(&err);
            }
        }
        Some(("rm", sub)) => {
            let key = sub.get_one::<String>("KEY").unwrap();

            if let Err(err) = storage.remove(key).await {
                fail(&err);
            }
        }
        Some(("rmdir", sub)) => {
            let dir = sub.get_one::<String>("DIR").unwrap();

            if let Err(err) = storage.remove_directory(dir).await {
                fail(&err);
            }
        }
        Some(("ls", sub)) => {
            let dir = sub.get_one::<String>("DIR").unwrap();
            let opts = ListOptions {
                last_key: sub.get_one::<String>("last-key").cloned(),
                max_keys: sub.get_one::<i32>("max-keys").copied(),
                delimiter: sub.get_one::<String>("delimiter").cloned(),
                deep_query: sub.get_flag("deep"),
            };

            match storage.list(dir, opts).await {
                Err(err) => fail(&err),
                Ok(page) => print_json(&page),
            }
        }
        _ => unreachable!("subcommand is required"),
    }
}

fn acl_from_flag(public: bool) -> Acl {
    if public {
        Acl::Public
    } else {
        Acl::Private
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("failed to serialize output")
    );
}

fn fail(err: &gcstore::StorageError) -> ! {
    error!(error_message = %err, error_group = "storage");
    std::process::exit(1);
}
