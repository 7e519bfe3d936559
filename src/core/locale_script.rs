//! Windows batch script that switches a workstation to Vietnamese locale
//!
//! Clinic workstations need `vi-VN` culture, language list, system locale
//! and home location for the desktop application to render dates and
//! diacritics correctly. The script re-launches itself elevated through UAC
//! and then runs the four PowerShell commands.

/// Download file name
pub const FILE_NAME: &str = "SetVietnameseLocale.bat";

/// PowerShell commands run by the script, in order, with their progress labels
pub const STEPS: [(&str, &str); 4] = [
    ("Dang cai dat Culture...", "Set-Culture vi-VN"),
    (
        "Dang cai dat Language List...",
        "$l=New-WinUserLanguageList vi-VN; Set-WinUserLanguageList $l -Force",
    ),
    ("Dang cai dat System Locale...", "Set-WinSystemLocale vi-VN"),
    ("Dang cai dat Home Location...", "Set-WinHomeLocation -GeoId 235"),
];

const HEADER: &str = r#"@echo off
:: Batch file chay PowerShell script voi quyen Administrator
:: Nhap dup vao file nay de chay

echo ============================================
echo   Cai dat tieng Viet cho Windows
echo ============================================
echo.

:: Yeu cau quyen admin
>nul 2>&1 "%SYSTEMROOT%\system32\cacls.exe" "%SYSTEMROOT%\system32\config\system"
if '%errorlevel%' NEQ '0' (
    echo Dang yeu cau quyen Administrator...
    goto UACPrompt
) else ( goto gotAdmin )

:UACPrompt
    echo Set UAC = CreateObject^("Shell.Application"^) > "%temp%\getadmin.vbs"
    echo UAC.ShellExecute "%~s0", "", "", "runas", 1 >> "%temp%\getadmin.vbs"
    "%temp%\getadmin.vbs"
    exit /B

:gotAdmin
    if exist "%temp%\getadmin.vbs" ( del "%temp%\getadmin.vbs" )
    pushd "%CD%"
    CD /D "%~dp0"

:: Chay lenh PowerShell
"#;

const FOOTER: &str = r#"echo.
echo ========================================
echo   Hoan tat! Vui long khoi dong lai may.
echo ========================================
echo.

pause
"#;

/// Renders the script with CRLF line endings, as `cmd.exe` expects
pub fn render() -> String {
    let mut script = String::from(HEADER);
    for (index, (label, command)) in STEPS.iter().enumerate() {
        script.push_str(&format!(
            "echo [{}/{}] {}\npowershell -Command \"{}\"\n\n",
            index + 1,
            STEPS.len(),
            label,
            command
        ));
    }
    script.push_str(FOOTER);
    script.replace('\n', "\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_runs_every_step_in_order() {
        let script = render();
        let positions: Vec<usize> = STEPS
            .iter()
            .map(|(_, command)| script.find(command).unwrap())
            .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(script.contains("echo [4/4] Dang cai dat Home Location..."));
    }

    #[test]
    fn test_script_elevates_and_uses_crlf() {
        let script = render();
        assert!(script.starts_with("@echo off\r\n"));
        assert!(script.contains("goto UACPrompt"));
        assert!(script.contains("\"runas\""));
        assert!(!script.replace("\r\n", "").contains('\n'));
    }
}
