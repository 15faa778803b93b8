//! Captured `smbstatus` and `ps` output.
//!
//! The reports mirror what Samba 4.13 prints with `-n`; numbers in the doc
//! comments are what the parsers must return for them.

/// `smbstatus -L -n`: two locks, one file name with a space.
pub const LOCKS: &str = "\
Locked files:
Pid          Uid        DenyMode   Access      R/W        Oplock           SharePath   Name   Time
--------------------------------------------------------------------------------------------------
1121         1000       DENY_NONE  0x120089    RDONLY     LEASE(RWH)       /srv/data   report 2021.pdf   Sun May 16 14:08:11 2021
1121         1000       DENY_WRITE 0x12019f    RDWR       NONE             /srv/data   notes.txt   Sun May 16 14:09:12 2021

";

/// `smbstatus -L -n` with nothing locked.
pub const NO_LOCKS: &str = "No locked files\n";

/// `smbstatus -S -n`: three connections to two services, one encrypted.
pub const SHARES: &str = "
Service      pid     Machine       Connected at                     Encryption   Signing     
---------------------------------------------------------------------------------------------
IPC$         1120    192.168.1.242 Sun May 16 02:07:02 PM 2021 CEST     -            -           
data         1121    192.168.1.243 Sun May 16 14:07:02 2021 CEST     AES-128-CCM  AES-128-CMAC
data         1122    192.168.1.244 Sun May 16 14:07:05 2021 CEST     -            AES-128-CMAC
";

/// `smbstatus -S -n` of a clustered server.
pub const CLUSTER_SHARES: &str = "
PID     Username     Group        Machine                                   Protocol Version  Encryption           Signing              
----------------------------------------------------------------------------------------------------------------------------------------
1:3028    1000    1000        192.168.1.242 (ipv4:192.168.1.242:42286)  SMB3_11           -                    partial(AES-128-CMAC)
2:3029    1000    1000        192.168.1.243 (ipv4:192.168.1.243:42287)  SMB3_11           -                    partial(AES-128-CMAC)
";

/// `smbstatus -p -n`: three processes, one of them anonymous.
pub const PROCESSES: &str = "
Samba version 4.13.5-Debian
PID     Username     Group        Machine                                   Protocol Version  Encryption           Signing              
----------------------------------------------------------------------------------------------------------------------------------------
1120    1000         1000         192.168.1.242 (ipv4:192.168.1.242:42296)  SMB3_11           -                    partial(AES-128-CMAC)
1121    1000         1000         192.168.1.243 (ipv4:192.168.1.243:42297)  SMB3_11           AES-128-CCM          AES-128-CMAC
1122    nobody       nogroup      192.168.1.244 (ipv4:192.168.1.244:42298)  SMB3_02           -                    -
";

/// `ps -e -o pid=,pcpu=,pmem=,rss=,vsz=,nlwp=,comm=`: two `smbd` workers
/// among other processes.
pub const PS: &str = "    1  0.0  0.1  11264 167744    1 systemd
 1100  0.2  0.5  20480  90112    1 smbd
 1120  1.5  0.8  32768 102400    2 smbd
 1200  0.0  0.0   2048   8192    1 bash
";

/// Replaces the data rows of a report with `rows`, keeping its header.
#[must_use]
pub fn with_rows(report: &str, rows: &[&str]) -> String {
    let mut text = String::new();
    for line in report.lines() {
        text.push_str(line);
        text.push('\n');
        if line.starts_with("-----") {
            break;
        }
    }
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}
