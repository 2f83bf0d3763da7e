/// Analysis prompt; `{command}` is replaced with the command text.
const TEMPLATE: &str = r#"Analyze this Bash command for safety AND efficiency issues:

```bash
{command}
```

**Safety concerns:**
- Does it delete or modify critical files? (rm -rf /, system files)
- Does it expose sensitive data? (cat ~/.ssh/*, env vars, credentials)
- Does it have destructive side effects? (force push, hard reset without confirmation)
- Could it cause data loss or system instability?

**Inefficiency concerns (treat these as UNSAFE too):**
- Uses `xargs -I{} sh -c` when the tool accepts multiple args directly
- Uses `xargs` when the downstream tool reads stdin natively (rg, sd, etc)
- Uses `| head -1` when the tool has native early-exit (fd -1)
- Multi-stage pipelines when a single pass is possible (awk | awk)
- Uses find when fd/rg is more appropriate
- Text tools (sed/grep) for structural code changes (use ast-grep)
- Missing --null for filename safety with rg/fd

Respond with ONLY one of these formats:
SAFE: <brief reason why it's safe and efficient>
UNSAFE: <specific security OR efficiency concern>

**Safety examples:**
- "ls -la" → SAFE: Read-only directory listing
- "rm -rf /" → UNSAFE: Deletes entire filesystem
- "git reset --hard HEAD~5" → UNSAFE: Destructive history rewrite
- "npm test" → SAFE: Runs test suite without modifying files

**Efficiency examples (treat as UNSAFE):**
- "rg -l pattern | xargs sd old new" → UNSAFE: Inefficient - sd reads stdin directly, use: rg -l --null pattern | sd --null old new
- "fd file | head -1 | xargs cat" → UNSAFE: Inefficient - use fd -1 with -x, not head + xargs
- "find . -name '*.py' | xargs command" → UNSAFE: Inefficient - use fd or find -exec
- "awk ... | awk ..." → UNSAFE: Inefficient - use single-pass awk with explicit state
- "xargs -I{} sh -c 'echo {}; cat {}'" → UNSAFE: Inefficient - spawns a shell per file, use -x or a direct command
"#;

/// Build the safety-and-efficiency analysis prompt for `command`.
pub fn build_prompt(command: &str) -> String {
    TEMPLATE.replace("{command}", command)
}
