/// Actions the web scanner may be asked to perform.
pub const DEFAULT_SQLMAP_ALLOWED_ACTIONS: &[&str] = &[
    "--dbs",
    "--tables",
    "--columns",
    "--current-db",
    "--current-user",
    "--banner",
    "--is-dba",
    "--users",
];

/// Web scanner flags that must never reach the child process.
pub const DEFAULT_SQLMAP_DENIED_FLAGS: &[&str] = &[
    "--dump-all",
    "--os-shell",
    "--os-pwn",
    "--os-cmd",
    "--os-smbrelay",
    "--os-bof",
    "--sql-shell",
    "--file-read",
    "--file-write",
    "--file-dest",
    "--priv-esc",
    "--reg-read",
    "--reg-add",
    "--reg-del",
    "--eval",
];

/// Port scanner flags that touch the filesystem or run scripts.
pub const DEFAULT_NMAP_DENIED_FLAGS: &[&str] = &[
    "--script",
    "--script-args",
    "-iL",
    "-oN",
    "-oX",
    "-oG",
    "-oA",
    "-oS",
    "--resume",
    "--datadir",
    "--stylesheet",
];
