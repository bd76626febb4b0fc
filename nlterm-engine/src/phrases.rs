// ABOUTME: holds the static phrase catalog mapping natural-language keys to shell commands.
// ABOUTME: table order is significant: it breaks ties for matching and orders suggestions.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseEntry {
    pub key: &'static str,
    pub command: &'static str,
    pub explanation: &'static str,
}

const fn phrase(
    key: &'static str,
    command: &'static str,
    explanation: &'static str,
) -> PhraseEntry {
    PhraseEntry {
        key,
        command,
        explanation,
    }
}

pub static PHRASES: &[PhraseEntry] = &[
    // files
    phrase(
        "list files",
        "ls -la",
        "Lists all files and directories in the current location, including hidden files, with detailed information like permissions, owner, size, and modification date.",
    ),
    phrase(
        "list all files",
        "ls -la",
        "Displays a detailed listing of all files including hidden ones (those starting with .).",
    ),
    phrase("show files", "ls -la", "Shows all files in the current directory with full details."),
    phrase(
        "create folder",
        "mkdir new_folder",
        "Creates a new directory called \"new_folder\" in the current location.",
    ),
    phrase(
        "make directory",
        "mkdir new_directory",
        "Creates a new directory. Replace \"new_directory\" with your desired folder name.",
    ),
    phrase(
        "delete file",
        "rm filename",
        "Removes the specified file. Replace \"filename\" with the actual file name. Use with caution!",
    ),
    phrase(
        "copy file",
        "cp source destination",
        "Copies a file from source to destination. Replace with actual paths.",
    ),
    phrase(
        "move file",
        "mv source destination",
        "Moves or renames a file from source to destination.",
    ),
    phrase(
        "find files",
        "find . -name \"*.txt\"",
        "Searches for all .txt files in the current directory and subdirectories.",
    ),
    // system
    phrase(
        "show disk space",
        "df -h",
        "Displays disk space usage in human-readable format (GB, MB, etc.).",
    ),
    phrase(
        "check disk usage",
        "du -sh *",
        "Shows the size of each file and folder in the current directory.",
    ),
    phrase(
        "show memory",
        "free -h",
        "Displays RAM usage including total, used, and available memory.",
    ),
    phrase(
        "system info",
        "uname -a",
        "Shows detailed system information including kernel version and architecture.",
    ),
    phrase("current directory", "pwd", "Prints the full path of the current working directory."),
    phrase("where am i", "pwd", "Shows your current location in the file system."),
    // processes
    phrase("running processes", "ps aux", "Lists all running processes with detailed information."),
    phrase("show processes", "ps aux | head -20", "Displays the top 20 running processes."),
    phrase(
        "find process",
        "ps aux | grep process_name",
        "Searches for a specific process. Replace \"process_name\" with what you're looking for.",
    ),
    // network
    phrase(
        "check internet",
        "ping -c 4 google.com",
        "Tests internet connectivity by sending 4 ping requests to Google.",
    ),
    phrase("show ip", "ip addr show", "Displays all network interfaces and their IP addresses."),
    phrase(
        "network connections",
        "netstat -tuln",
        "Shows all active network connections and listening ports.",
    ),
    phrase("download file", "curl -O url", "Downloads a file from the specified URL."),
    // git
    phrase(
        "git status",
        "git status",
        "Shows the current state of your git repository including modified and staged files.",
    ),
    phrase(
        "git history",
        "git log --oneline -10",
        "Displays the last 10 commits in a compact format.",
    ),
    phrase(
        "create branch",
        "git checkout -b branch_name",
        "Creates a new git branch and switches to it.",
    ),
    // text
    phrase(
        "search in files",
        "grep -r \"search_term\" .",
        "Searches for text in all files recursively in the current directory.",
    ),
    phrase("count lines", "wc -l filename", "Counts the number of lines in a file."),
    phrase("view file", "cat filename", "Displays the contents of a file."),
    phrase("edit file", "nano filename", "Opens the file in the nano text editor."),
    // date and time
    phrase("current time", "date", "Displays the current date and time."),
    phrase("calendar", "cal", "Shows a calendar for the current month."),
    // user
    phrase("who am i", "whoami", "Displays the current logged-in username."),
    phrase("current user", "whoami", "Shows which user account you are using."),
    // screen
    phrase("clear screen", "clear", "Clears the terminal screen."),
    phrase("clear", "clear", "Clears the terminal display."),
];

pub fn lookup(key: &str) -> Option<&'static PhraseEntry> {
    PHRASES.iter().find(|p| p.key == key)
}
